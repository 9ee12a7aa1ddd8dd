//! Time subsystem.
//!
//! - `AnimationClock` turns absolute milliseconds into a cyclic phase/angle
//! - `FrameClock` is the host-side tick source that produces those milliseconds
//!
//! Keep one `FrameClock` per surface and call `tick()` once per presented frame.

mod animation;
mod frame_clock;

pub use animation::{angle_degrees, phase, AnimationClock};
pub use frame_clock::{FrameClock, FrameTime};
