//! Logging utilities.
//!
//! Centralizes logger initialization and frame-failure diagnostics on top of
//! the `log` facade.

mod init;
mod throttle;

pub use init::{init_logging, LoggingConfig};
pub(crate) use throttle::FailureLog;
