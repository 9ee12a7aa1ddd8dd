use crate::camera::{CameraRig, InvalidFrustumError};
use crate::coords::Viewport;
use crate::device::{Backend, BindingKind, TextureHandle};
use crate::geometry::GeometryBuffer;
use crate::logging::FailureLog;
use crate::paint::Color;
use crate::pipeline::{FrameBindings, FrameInputs, FramePipeline, FrameReport};
use crate::scene::{Material, Scene};
use crate::shader::ShaderProgram;
use crate::time::AnimationClock;

use super::guard::SerialGuard;
use super::SetupError;

/// Renderer-level knobs that are not part of a scene.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub clear_color: Color,
    /// Overrides the scene's animation period.
    pub period_ms: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            period_ms: None,
        }
    }
}

/// GPU resources of one surface session.
struct Session {
    // Held for the session's lifetime; locations are resolved at setup.
    _program: ShaderProgram,
    _geometry: GeometryBuffer,
    pipeline: FramePipeline,
    camera: CameraRig,
    clock: AnimationClock,
}

enum Lifecycle {
    Uncreated,
    Ready(Box<Session>),
    Failed,
}

/// Drives one scene on one surface through the three host callbacks.
pub struct Renderer {
    scene: Scene,
    config: RendererConfig,
    guard: SerialGuard,
    state: Lifecycle,
    failures: FailureLog,
}

impl Renderer {
    pub fn new(scene: Scene, config: RendererConfig) -> Self {
        Self {
            scene,
            config,
            guard: SerialGuard::default(),
            state: Lifecycle::Uncreated,
            failures: FailureLog::default(),
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns `true` once a session has been built and not lost.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, Lifecycle::Ready(_))
    }

    /// Builds program, geometry, textures and camera for a new surface.
    ///
    /// Any previous session is discarded first. On error the renderer stays
    /// unusable until the next `on_create`.
    pub fn on_create<B>(&mut self, backend: &mut B, viewport: Viewport) -> Result<(), SetupError>
    where
        B: Backend + ?Sized,
    {
        self.guard.enter("on_create");
        self.state = Lifecycle::Uncreated;
        self.failures = FailureLog::default();

        match self.build_session(backend, viewport) {
            Ok(session) => {
                log::info!(
                    "scene {} ready: {} drawables, {}x{}",
                    self.scene.name,
                    session.pipeline.drawables().len(),
                    viewport.width,
                    viewport.height
                );
                self.state = Lifecycle::Ready(Box::new(session));
                Ok(())
            }
            Err(err) => {
                log::error!("scene {} setup failed: {err}", self.scene.name);
                self.state = Lifecycle::Failed;
                Err(err)
            }
        }
    }

    /// Recomputes the projection. A degenerate viewport is rejected and the
    /// previous projection stays in effect.
    pub fn on_resize<B>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), InvalidFrustumError>
    where
        B: Backend + ?Sized,
    {
        self.guard.enter("on_resize");

        let Lifecycle::Ready(session) = &mut self.state else {
            log::debug!("resize to {width}x{height} before a session exists; ignored");
            return Ok(());
        };

        match session.camera.resize(Viewport::new(width, height)) {
            Ok(()) => {
                backend.set_viewport(width, height);
                log::debug!("projection rebuilt for {width}x{height}");
                Ok(())
            }
            Err(err) => {
                log::warn!("resize ignored: {err}");
                Err(err)
            }
        }
    }

    /// Draws one frame for absolute time `now_ms`.
    pub fn on_frame<B>(&mut self, backend: &mut B, now_ms: u64) -> FrameReport
    where
        B: Backend + ?Sized,
    {
        self.guard.enter("on_frame");

        let Lifecycle::Ready(session) = &mut self.state else {
            return FrameReport::skipped();
        };

        if session.camera.policy().is_animated() {
            session.camera.advance(session.clock.angle_radians(now_ms));
        }
        let inputs = FrameInputs {
            projection: session.camera.projection(),
            view: session.camera.view(),
            angle_degrees: session.clock.angle_degrees(now_ms),
        };

        let report = session.pipeline.execute(backend, &inputs);
        match report.error() {
            Some(err) => self.failures.frame_failed(err),
            None => self.failures.frame_succeeded(),
        }
        report
    }

    fn build_session<B>(&self, backend: &mut B, viewport: Viewport) -> Result<Session, SetupError>
    where
        B: Backend + ?Sized,
    {
        let scene = &self.scene;

        let mut program = ShaderProgram::from_sources(backend, scene.shaders)?;
        let position = program
            .locate(backend, "a_Position", BindingKind::Attribute)
            .ok_or(SetupError::MissingBinding {
                name: "a_Position",
                kind: BindingKind::Attribute,
            })?;
        let matrix = program
            .locate(backend, "u_Matrix", BindingKind::Uniform)
            .ok_or(SetupError::MissingBinding {
                name: "u_Matrix",
                kind: BindingKind::Uniform,
            })?;
        let texcoord = match scene.layout.texcoord_attribute() {
            Some(_) => program.locate(backend, "a_Texture", BindingKind::Attribute),
            None => None,
        };
        let color = program.locate(backend, "u_Color", BindingKind::Uniform);

        let geometry = GeometryBuffer::create(backend, &scene.vertices, scene.layout)?;

        for drawable in &scene.drawables {
            if !geometry.contains(drawable.range) {
                return Err(SetupError::DrawableOutOfRange {
                    label: drawable.label,
                    first: drawable.range.first,
                    end: drawable.range.first as u64 + drawable.range.count as u64,
                    vertices: geometry.vertex_count(),
                });
            }
            if let Material::Texture(slot) = drawable.material {
                if slot >= scene.textures.len() {
                    return Err(SetupError::MissingTexture {
                        label: drawable.label,
                        slot,
                        available: scene.textures.len(),
                    });
                }
            }
        }

        let textures = scene
            .textures
            .iter()
            .enumerate()
            .map(|(slot, source)| {
                backend
                    .load(source)
                    .map_err(|source| SetupError::Texture { slot, source })
            })
            .collect::<Result<Vec<TextureHandle>, _>>()?;

        let camera = CameraRig::new(scene.camera, scene.frustum, viewport)?;
        backend.set_viewport(viewport.width, viewport.height);

        let clock = AnimationClock::new(self.config.period_ms.unwrap_or(scene.period_ms));

        let pipeline = FramePipeline::new(
            program.handle(),
            FrameBindings {
                position,
                texcoord,
                matrix,
                color,
            },
            geometry.handle(),
            geometry.position_attribute(),
            texcoord.and(geometry.texcoord_attribute()),
            scene.drawables.clone(),
            textures,
            self.config.clear_color,
        );

        Ok(Session {
            _program: program,
            _geometry: geometry,
            pipeline,
            camera,
            clock,
        })
    }
}
