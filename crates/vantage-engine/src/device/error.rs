use thiserror::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// GPU state error raised while recording or submitting a frame.
///
/// Everything except [`DeviceError::is_fatal`] errors only costs the current
/// frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("invalid GPU state: {0}")]
    InvalidState(String),

    #[error("unknown {kind} handle #{index}")]
    UnknownHandle { kind: &'static str, index: u32 },

    #[error("surface unavailable for this frame ({0:?})")]
    Surface(SurfaceErrorAction),

    #[error("GPU out of memory")]
    OutOfMemory,
}

impl DeviceError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        DeviceError::InvalidState(msg.into())
    }

    /// Returns `true` when the device cannot continue rendering at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DeviceError::OutOfMemory | DeviceError::Surface(SurfaceErrorAction::Fatal)
        )
    }
}

/// Texture could not be produced from its source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read texture file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode texture {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("texture pixel data is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_memory_exhaustion_is_fatal() {
        assert!(DeviceError::OutOfMemory.is_fatal());
        assert!(DeviceError::Surface(SurfaceErrorAction::Fatal).is_fatal());
        assert!(!DeviceError::Surface(SurfaceErrorAction::SkipFrame).is_fatal());
        assert!(!DeviceError::invalid_state("no program bound").is_fatal());
    }
}
