/// Rate limiter for per-frame failure logs.
///
/// The first failure of a streak is a warning, repeats go to debug, and the
/// first clean frame afterwards reports how many frames were lost.
#[derive(Debug, Default)]
pub(crate) struct FailureLog {
    streak: u64,
}

/// What to emit for one frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Emit {
    Warn,
    Debug,
    Recovered(u64),
    Nothing,
}

impl FailureLog {
    pub fn failed(&mut self) -> Emit {
        self.streak += 1;
        if self.streak == 1 { Emit::Warn } else { Emit::Debug }
    }

    pub fn succeeded(&mut self) -> Emit {
        match std::mem::take(&mut self.streak) {
            0 => Emit::Nothing,
            lost => Emit::Recovered(lost),
        }
    }

    /// Logs an abandoned frame.
    pub fn frame_failed(&mut self, err: &impl std::fmt::Display) {
        match self.failed() {
            Emit::Warn => log::warn!("frame abandoned: {err}"),
            _ => log::debug!("frame abandoned again: {err}"),
        }
    }

    /// Logs recovery if the previous frames were abandoned.
    pub fn frame_succeeded(&mut self) {
        if let Emit::Recovered(lost) = self.succeeded() {
            log::info!("rendering recovered after {lost} abandoned frame(s)");
        }
    }
}
