use glam::Vec3;

use crate::camera::{CameraPolicy, FrustumConfig, Orbit};
use crate::device::{TextureSource, Topology};
use crate::geometry::{VertexLayout, VertexRange};
use crate::paint::Color;
use crate::shader::ShaderSources;

use super::data::{AXES_TRIANGLE_VERTICES, CUBE_VERTICES};
use super::{Drawable, Material, Motion};

const TEXTURED_SHADERS: ShaderSources = ShaderSources {
    vertex: include_str!("shaders/textured.vert.wgsl"),
    fragment: include_str!("shaders/textured.frag.wgsl"),
};

const FLAT_SHADERS: ShaderSources = ShaderSources {
    vertex: include_str!("shaders/flat.vert.wgsl"),
    fragment: include_str!("shaders/flat.frag.wgsl"),
};

/// Default rotation/orbit period.
pub const DEFAULT_PERIOD_MS: u64 = 10_000;

/// Built-in scene configurations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneKind {
    /// Textured cube spinning about +Y while the camera orbits it.
    TexturedCube,
    /// Colored axis lines and a spinning triangle seen from a fixed camera.
    AxesTriangle,
}

/// Declarative description of everything a surface session renders.
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: &'static str,
    pub shaders: ShaderSources,
    pub vertices: Vec<f32>,
    pub layout: VertexLayout,
    /// Issued in this order every frame.
    pub drawables: Vec<Drawable>,
    pub textures: Vec<TextureSource>,
    pub camera: CameraPolicy,
    pub frustum: FrustumConfig,
    pub period_ms: u64,
}

impl SceneKind {
    pub fn name(self) -> &'static str {
        match self {
            SceneKind::TexturedCube => "textured-cube",
            SceneKind::AxesTriangle => "axes-triangle",
        }
    }

    pub fn build(self) -> Scene {
        match self {
            SceneKind::TexturedCube => textured_cube(),
            SceneKind::AxesTriangle => axes_triangle(),
        }
    }
}

impl Scene {
    /// Replaces texture `slot`; ignored when the scene has no such slot.
    pub fn with_texture(mut self, slot: usize, source: TextureSource) -> Self {
        match self.textures.get_mut(slot) {
            Some(texture) => *texture = source,
            None => log::warn!("scene {} has no texture slot {slot}", self.name),
        }
        self
    }

    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }
}

fn textured_cube() -> Scene {
    Scene {
        name: SceneKind::TexturedCube.name(),
        shaders: TEXTURED_SHADERS,
        vertices: CUBE_VERTICES.to_vec(),
        layout: VertexLayout::POSITION_TEXCOORD,
        drawables: vec![Drawable {
            label: "cube",
            topology: Topology::TriangleStrip,
            range: VertexRange::new(0, 24),
            material: Material::Texture(0),
            motion: Motion::Spin { axis: Vec3::Y },
        }],
        textures: vec![TextureSource::checkerboard(
            256,
            8,
            [235, 200, 140, 255],
            [120, 70, 30, 255],
        )],
        camera: CameraPolicy::Orbit(Orbit {
            radius: 4.0,
            height: 4.0,
            center: Vec3::ZERO,
            up: Vec3::Y,
        }),
        frustum: FrustumConfig {
            near: 2.0,
            far: 12.0,
            half_extent: 1.0,
        },
        period_ms: DEFAULT_PERIOD_MS,
    }
}

fn axes_triangle() -> Scene {
    let axis = |label, first, color| Drawable {
        label,
        topology: Topology::Lines,
        range: VertexRange::new(first, 2),
        material: Material::Color(color),
        motion: Motion::Static,
    };

    Scene {
        name: SceneKind::AxesTriangle.name(),
        shaders: FLAT_SHADERS,
        vertices: AXES_TRIANGLE_VERTICES.to_vec(),
        layout: VertexLayout::POSITION,
        drawables: vec![
            axis("x axis", 0, Color::RED),
            axis("y axis", 2, Color::GREEN),
            axis("z axis", 4, Color::BLUE),
            Drawable {
                label: "triangle",
                topology: Topology::TriangleList,
                range: VertexRange::new(6, 3),
                material: Material::Color(Color::YELLOW),
                motion: Motion::Spin { axis: Vec3::Y },
            },
        ],
        textures: Vec::new(),
        camera: CameraPolicy::Fixed {
            eye: Vec3::new(2.5, 2.0, 4.0),
            center: Vec3::ZERO,
            up: Vec3::Y,
        },
        frustum: FrustumConfig {
            near: 2.0,
            far: 12.0,
            half_extent: 1.0,
        },
        period_ms: DEFAULT_PERIOD_MS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_count(scene: &Scene) -> u32 {
        (scene.vertices.len() / scene.layout.floats_per_vertex() as usize) as u32
    }

    #[test]
    fn every_drawable_fits_its_geometry() {
        for kind in [SceneKind::TexturedCube, SceneKind::AxesTriangle] {
            let scene = kind.build();
            assert_eq!(scene.vertices.len() % scene.layout.floats_per_vertex() as usize, 0);
            for d in &scene.drawables {
                assert!(d.range.end() <= vertex_count(&scene), "{}: {}", scene.name, d.label);
                if let Material::Texture(slot) = d.material {
                    assert!(slot < scene.textures.len());
                }
            }
            scene.frustum.validate().unwrap();
        }
    }

    #[test]
    fn cube_is_a_single_textured_strip() {
        let scene = SceneKind::TexturedCube.build();
        assert_eq!(vertex_count(&scene), 24);
        assert_eq!(scene.drawables.len(), 1);
        assert_eq!(scene.drawables[0].topology, Topology::TriangleStrip);
        assert!(scene.camera.is_animated());
    }

    #[test]
    fn axes_are_drawn_before_the_triangle() {
        let scene = SceneKind::AxesTriangle.build();
        let order: Vec<_> = scene.drawables.iter().map(|d| d.label).collect();
        assert_eq!(order, ["x axis", "y axis", "z axis", "triangle"]);
        assert!(!scene.camera.is_animated());
    }

    #[test]
    fn with_texture_replaces_existing_slot_only() {
        let path = TextureSource::File("box.png".into());
        let scene = SceneKind::TexturedCube.build().with_texture(0, path.clone());
        assert_eq!(scene.textures, vec![path.clone()]);

        let scene = SceneKind::AxesTriangle.build().with_texture(0, path);
        assert!(scene.textures.is_empty());
    }
}
