use glam::Vec3;

use crate::coords::{rotation_degrees, Matrix4};
use crate::device::Topology;
use crate::geometry::VertexRange;
use crate::paint::Color;

/// Surface appearance of a drawable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    /// Flat color uploaded to the program's color uniform.
    Color(Color),
    /// Index into the scene's texture list, bound on unit 0.
    Texture(usize),
}

/// How a drawable's model matrix follows the animation clock.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Motion {
    /// Identity model matrix.
    Static,
    /// Rotation about `axis` by the clock's angle in degrees.
    Spin { axis: Vec3 },
}

/// One renderable primitive. Immutable for the whole session; only the model
/// matrix derived from it changes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub label: &'static str,
    pub topology: Topology,
    pub range: VertexRange,
    pub material: Material,
    pub motion: Motion,
}

impl Drawable {
    /// Model matrix at `angle_degrees`. Recomputed from scratch every frame.
    pub fn model_matrix(&self, angle_degrees: f32) -> Matrix4 {
        match self.motion {
            Motion::Static => Matrix4::IDENTITY,
            Motion::Spin { axis } => rotation_degrees(angle_degrees, axis),
        }
    }
}
