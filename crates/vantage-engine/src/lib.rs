//! Vantage engine crate.
//!
//! A minimal real-time 3D renderer: camera, animation clock and a per-frame
//! transform & draw pipeline over a small set of built-in scenes, plus the
//! wgpu/winit host pieces that run it in a window.

pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod pipeline;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;
