//! Camera rig: view and projection matrices.
//!
//! The rig exclusively owns both matrices. The projection is rebuilt on every
//! resize; the view is built once, or every frame when the eye orbits.

mod frustum;
mod policy;
mod rig;

pub use frustum::{FrustumConfig, FrustumExtents, InvalidFrustumError};
pub use policy::{CameraPolicy, Orbit};
pub use rig::CameraRig;
