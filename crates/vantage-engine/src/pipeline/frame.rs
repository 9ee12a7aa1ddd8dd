use crate::coords::{to_column_major, Matrix4};
use crate::device::{
    BufferHandle, DeviceError, Location, ProgramHandle, RenderDevice, TextureHandle, TextureUnit,
    VertexAttribute,
};
use crate::paint::Color;
use crate::scene::{Drawable, Material};

use super::{FrameError, FrameOutcome, FrameReport, FrameStage};

/// `projection * (view * model)`.
///
/// Applied to a column vector the model transform acts first and the
/// projection last.
#[inline]
pub fn compose_mvp(projection: Matrix4, view: Matrix4, model: Matrix4) -> Matrix4 {
    projection * (view * model)
}

fn at(stage: FrameStage) -> impl FnOnce(DeviceError) -> (FrameStage, DeviceError) {
    move |e| (stage, e)
}

/// Binding slots resolved once when the program is built.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameBindings {
    pub position: Location,
    pub texcoord: Option<Location>,
    pub matrix: Location,
    pub color: Option<Location>,
}

/// Per-frame values handed to the pipeline by value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInputs {
    pub projection: Matrix4,
    pub view: Matrix4,
    pub angle_degrees: f32,
}

/// Immutable per-session draw plan.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    program: ProgramHandle,
    bindings: FrameBindings,
    buffer: BufferHandle,
    position: VertexAttribute,
    texcoord: Option<VertexAttribute>,
    drawables: Vec<Drawable>,
    textures: Vec<TextureHandle>,
    clear: Color,
}

impl FramePipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        program: ProgramHandle,
        bindings: FrameBindings,
        buffer: BufferHandle,
        position: VertexAttribute,
        texcoord: Option<VertexAttribute>,
        drawables: Vec<Drawable>,
        textures: Vec<TextureHandle>,
        clear: Color,
    ) -> Self {
        Self {
            program,
            bindings,
            buffer,
            position,
            texcoord,
            drawables,
            textures,
            clear,
        }
    }

    #[inline]
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Runs one frame. Never panics on device errors; they are reported.
    pub fn execute<D>(&self, device: &mut D, inputs: &FrameInputs) -> FrameReport
    where
        D: RenderDevice + ?Sized,
    {
        if let Err(source) = device.begin_frame(self.clear) {
            return FrameReport {
                issued: 0,
                outcome: FrameOutcome::Abandoned(FrameError {
                    stage: FrameStage::Clear,
                    drawable: None,
                    source,
                }),
            };
        }

        let mut issued = 0;
        let mut drawn = Ok(());
        for (index, drawable) in self.drawables.iter().enumerate() {
            if let Err((stage, source)) = self.draw_one(device, inputs, drawable) {
                drawn = Err(FrameError {
                    stage,
                    drawable: Some(index),
                    source,
                });
                break;
            }
            issued += 1;
        }

        let outcome = match drawn {
            Ok(()) => match device.end_frame() {
                Ok(()) => FrameOutcome::Completed,
                Err(source) => FrameOutcome::Abandoned(FrameError {
                    stage: FrameStage::Submit,
                    drawable: None,
                    source,
                }),
            },
            Err(err) => {
                // Whatever was already issued still goes out.
                if !err.source.is_fatal() {
                    if let Err(e) = device.end_frame() {
                        log::debug!("submit after abandoned frame failed: {e}");
                    }
                }
                FrameOutcome::Abandoned(err)
            }
        };

        FrameReport { issued, outcome }
    }

    fn draw_one<D>(
        &self,
        device: &mut D,
        inputs: &FrameInputs,
        drawable: &Drawable,
    ) -> Result<(), (FrameStage, DeviceError)>
    where
        D: RenderDevice + ?Sized,
    {
        let model = drawable.model_matrix(inputs.angle_degrees);

        let mvp = compose_mvp(inputs.projection, inputs.view, model);
        device
            .use_program(self.program)
            .map_err(at(FrameStage::ComposeMvp))?;
        device
            .set_uniform_mat4(self.bindings.matrix, &to_column_major(&mvp))
            .map_err(at(FrameStage::ComposeMvp))?;

        self.bind_state(device, drawable)
            .map_err(at(FrameStage::BindState))?;

        device
            .draw_arrays(drawable.topology, drawable.range.first, drawable.range.count)
            .map_err(at(FrameStage::Draw))
    }

    fn bind_state<D>(&self, device: &mut D, drawable: &Drawable) -> Result<(), DeviceError>
    where
        D: RenderDevice + ?Sized,
    {
        device.bind_vertex_attribute(self.bindings.position, self.buffer, self.position)?;
        if let (Some(location), Some(attribute)) = (self.bindings.texcoord, self.texcoord) {
            device.bind_vertex_attribute(location, self.buffer, attribute)?;
        }

        match drawable.material {
            Material::Texture(slot) => {
                let texture = self.textures.get(slot).copied().ok_or_else(|| {
                    DeviceError::invalid_state(format!("no texture in slot {slot}"))
                })?;
                device.bind_texture(TextureUnit::ZERO, texture)
            }
            Material::Color(color) => match self.bindings.color {
                Some(location) => device.set_uniform_vec4(location, color.to_array()),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingDevice};
    use crate::device::Topology;
    use crate::geometry::VertexRange;
    use crate::scene::Motion;
    use glam::Vec3;

    fn drawable(label: &'static str, first: u32, material: Material) -> Drawable {
        Drawable {
            label,
            topology: Topology::Lines,
            range: VertexRange::new(first, 2),
            material,
            motion: Motion::Static,
        }
    }

    fn pipeline(drawables: Vec<Drawable>) -> FramePipeline {
        FramePipeline::new(
            ProgramHandle::from_raw(0),
            FrameBindings {
                position: Location(0),
                texcoord: None,
                matrix: Location(0),
                color: Some(Location(64)),
            },
            BufferHandle::from_raw(0),
            VertexAttribute {
                components: 3,
                stride: 12,
                offset: 0,
            },
            None,
            drawables,
            vec![TextureHandle::from_raw(7)],
            Color::BLACK,
        )
    }

    fn three_drawables() -> FramePipeline {
        pipeline(vec![
            drawable("a", 0, Material::Color(Color::RED)),
            drawable("b", 2, Material::Color(Color::GREEN)),
            drawable("c", 4, Material::Texture(0)),
        ])
    }

    fn inputs() -> FrameInputs {
        FrameInputs {
            projection: Matrix4::from_scale(Vec3::new(2.0, 3.0, 4.0)),
            view: Matrix4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            angle_degrees: 0.0,
        }
    }

    #[test]
    fn mvp_with_identity_model_is_projection_times_view() {
        let p = Matrix4::perspective_rh_gl(1.0, 1.5, 0.1, 10.0);
        let v = Matrix4::look_at_rh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(compose_mvp(p, v, Matrix4::IDENTITY), p * v);
    }

    #[test]
    fn mvp_with_identity_camera_is_model() {
        let m = Matrix4::from_rotation_y(0.7) * Matrix4::from_translation(Vec3::X);
        assert_eq!(compose_mvp(Matrix4::IDENTITY, Matrix4::IDENTITY, m), m);
    }

    #[test]
    fn mvp_applies_model_first() {
        let p = Matrix4::from_scale(Vec3::splat(2.0));
        let v = Matrix4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        let m = Matrix4::from_translation(Vec3::X);
        let out = compose_mvp(p, v, m).transform_point3(Vec3::ZERO);
        // translate by +x, then -z, then scale
        assert!(out.abs_diff_eq(Vec3::new(2.0, 0.0, -2.0), 1e-6));
    }

    #[test]
    fn frame_issues_calls_in_declared_order() {
        let mut dev = RecordingDevice::new();
        let report = three_drawables().execute(&mut dev, &inputs());

        assert!(report.is_complete());
        assert_eq!(report.issued, 3);

        let calls = dev.calls();
        assert_eq!(calls.first(), Some(&Call::BeginFrame(Color::BLACK)));
        assert_eq!(calls.last(), Some(&Call::EndFrame));

        let firsts: Vec<u32> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw { first, .. } => Some(*first),
                _ => None,
            })
            .collect();
        assert_eq!(firsts, [0, 2, 4]);
    }

    #[test]
    fn each_drawable_rebinds_program_attributes_and_material() {
        let mut dev = RecordingDevice::new();
        three_drawables().execute(&mut dev, &inputs());

        let calls = dev.calls();
        let per_draw = &calls[1..6];
        assert_eq!(per_draw[0], Call::UseProgram(ProgramHandle::from_raw(0)));
        assert!(matches!(per_draw[1], Call::UniformMat4 { location: Location(0), .. }));
        assert!(matches!(per_draw[2], Call::BindAttribute { location: Location(0), .. }));
        assert_eq!(
            per_draw[3],
            Call::UniformVec4 {
                location: Location(64),
                value: Color::RED.to_array(),
            }
        );
        assert!(matches!(per_draw[4], Call::Draw { first: 0, .. }));

        assert!(calls.contains(&Call::BindTexture {
            unit: TextureUnit::ZERO,
            texture: TextureHandle::from_raw(7),
        }));
    }

    #[test]
    fn uploaded_matrix_is_column_major_mvp() {
        let mut dev = RecordingDevice::new();
        let inputs = inputs();
        pipeline(vec![drawable("a", 0, Material::Color(Color::RED))]).execute(&mut dev, &inputs);

        let expected = to_column_major(&(inputs.projection * inputs.view));
        assert!(dev.calls().contains(&Call::UniformMat4 {
            location: Location(0),
            value: expected,
        }));
    }

    #[test]
    fn error_mid_frame_keeps_earlier_draws_and_skips_the_rest() {
        let mut dev = RecordingDevice::new();
        dev.fail_draw(1);

        let report = three_drawables().execute(&mut dev, &inputs());

        assert_eq!(report.issued, 1);
        let err = report.error().expect("abandoned");
        assert_eq!(err.stage, FrameStage::Draw);
        assert_eq!(err.drawable, Some(1));
        assert!(!report.is_fatal());

        let draws = dev.calls().iter().filter(|c| matches!(c, Call::Draw { .. })).count();
        assert_eq!(draws, 1);
        // The partial frame is still submitted.
        assert_eq!(dev.calls().last(), Some(&Call::EndFrame));
    }

    #[test]
    fn next_frame_starts_clean_after_an_abandoned_one() {
        let mut dev = RecordingDevice::new();
        let pipeline = three_drawables();

        dev.fail_draw(1);
        assert!(!pipeline.execute(&mut dev, &inputs()).is_complete());

        dev.clear_calls();
        let report = pipeline.execute(&mut dev, &inputs());

        assert!(report.is_complete());
        assert_eq!(report.issued, 3);
        assert_eq!(dev.calls().first(), Some(&Call::BeginFrame(Color::BLACK)));
    }

    #[test]
    fn clear_failure_abandons_before_any_draw() {
        let mut dev = RecordingDevice::new();
        dev.fail_begin_frame(DeviceError::Surface(crate::device::SurfaceErrorAction::SkipFrame));

        let report = three_drawables().execute(&mut dev, &inputs());

        assert_eq!(report.issued, 0);
        assert_eq!(report.error().map(|e| e.stage), Some(FrameStage::Clear));
        assert!(!dev.calls().contains(&Call::EndFrame));
    }

    #[test]
    fn fatal_error_is_flagged_and_not_submitted() {
        let mut dev = RecordingDevice::new();
        dev.fail_draw_with(0, DeviceError::OutOfMemory);

        let report = three_drawables().execute(&mut dev, &inputs());

        assert!(report.is_fatal());
        assert!(!dev.calls().contains(&Call::EndFrame));
    }

    #[test]
    fn missing_texture_slot_abandons_at_bind_state() {
        let mut dev = RecordingDevice::new();
        let report = pipeline(vec![drawable("t", 0, Material::Texture(3))])
            .execute(&mut dev, &inputs());

        let err = report.error().expect("abandoned");
        assert_eq!(err.stage, FrameStage::BindState);
        assert_eq!(report.issued, 0);
    }
}
