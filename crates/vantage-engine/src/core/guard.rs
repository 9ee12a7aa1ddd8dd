use std::thread::{self, ThreadId};

/// Asserts that lifecycle callbacks all arrive on one thread.
///
/// The owning thread is the one that delivers the first callback.
#[derive(Debug, Default)]
pub(crate) struct SerialGuard {
    owner: Option<ThreadId>,
}

impl SerialGuard {
    #[track_caller]
    pub fn enter(&mut self, callback: &'static str) {
        let current = thread::current().id();
        let owner = *self.owner.get_or_insert(current);
        assert_eq!(
            owner, current,
            "renderer callback `{callback}` delivered on a different thread than the first callback"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_thread_is_accepted_repeatedly() {
        let mut guard = SerialGuard::default();
        guard.enter("on_create");
        guard.enter("on_frame");
        guard.enter("on_resize");
    }

    #[test]
    fn other_thread_is_rejected() {
        let mut guard = SerialGuard::default();
        guard.enter("on_create");
        let result = thread::spawn(move || guard.enter("on_frame")).join();
        assert!(result.is_err());
    }
}
