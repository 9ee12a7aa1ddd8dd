//! Per-frame executor.
//!
//! `FramePipeline` walks a scene's drawables in declared order:
//!
//! ```text
//! IDLE -> CLEAR -> (COMPUTE_MODEL -> COMPOSE_MVP -> BIND_STATE -> DRAW)* -> SUBMIT -> IDLE
//! ```
//!
//! A device error abandons the rest of the frame only; the next frame starts
//! again from CLEAR with no state carried over.

mod frame;
mod report;

pub use frame::{compose_mvp, FrameBindings, FrameInputs, FramePipeline};
pub use report::{FrameError, FrameOutcome, FrameReport, FrameStage};
