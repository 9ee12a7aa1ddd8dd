//! Device traits over wgpu.
//!
//! GL-style immediate calls are recorded into the current [`GpuFrame`] and
//! replayed inside a single render pass by `end_frame`. Each draw snapshots
//! the staged uniforms into its own dynamic-offset slot, so later uniform
//! writes never leak into earlier draws.

use wgpu::util::DeviceExt;

use crate::geometry::AllocationError;
use crate::paint::Color;
use crate::shader::ShaderError;

use super::frame::{FrameRecording, GpuFrame, PipelineKey, RecordedDraw};
use super::gpu::{CompiledShader, GpuTexture, LinkedProgram};
use super::reflect::{link_stages, reflect_stage, TEXTURE_GROUP, UNIFORM_GROUP};
use super::{
    texture, BindingKind, BufferHandle, DeviceError, Gpu, LoadError, Location, ProgramHandle,
    RenderDevice, ShaderCompiler, ShaderHandle, ShaderStage, SurfaceErrorAction, TextureHandle,
    TextureLoader, TextureSource, TextureUnit, Topology, VertexAttribute,
};

fn vertex_format(components: u32) -> Result<wgpu::VertexFormat, DeviceError> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        n => Err(DeviceError::invalid_state(format!(
            "vertex attributes have 1 to 4 float components, got {n}"
        ))),
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::Lines => wgpu::PrimitiveTopology::LineList,
    }
}

impl Gpu<'_> {
    fn recording(&mut self) -> Result<&mut FrameRecording, DeviceError> {
        self.frame
            .as_mut()
            .map(|f| &mut f.recording)
            .ok_or_else(|| DeviceError::invalid_state("no frame in progress"))
    }

    fn program(&self, handle: ProgramHandle) -> Result<&LinkedProgram, DeviceError> {
        self.programs
            .get(handle.index())
            .ok_or(DeviceError::UnknownHandle {
                kind: "program",
                index: handle.raw(),
            })
    }

    fn current_program(&self) -> Result<(ProgramHandle, &LinkedProgram), DeviceError> {
        let handle = self
            .frame
            .as_ref()
            .and_then(|f| f.recording.state.program)
            .ok_or_else(|| DeviceError::invalid_state("no program in use"))?;
        Ok((handle, self.program(handle)?))
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) -> Result<(), DeviceError> {
        if self.pipelines.contains_key(key) {
            return Ok(());
        }

        let program = self.program(key.program)?;
        let vertex = &self.shaders[program.vertex];
        let fragment = &self.shaders[program.fragment];

        let mut attributes = Vec::with_capacity(key.attributes.len());
        for (location, attribute) in &key.attributes {
            attributes.push([wgpu::VertexAttribute {
                format: vertex_format(attribute.components)?,
                offset: attribute.offset as u64,
                shader_location: *location,
            }]);
        }
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .attributes
            .iter()
            .zip(&attributes)
            .map(|((_, attribute), attrs)| wgpu::VertexBufferLayout {
                array_stride: attribute.stride as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("vantage program pipeline"),
                layout: Some(&program.layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.interface.entry_point.as_str()),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.interface.entry_point.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: primitive_topology(key.topology),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: self.depth_format,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!(
            "created pipeline for program #{} ({:?}, {} vertex buffers)",
            key.program.raw(),
            key.topology,
            key.attributes.len()
        );
        self.pipelines.insert(key.clone(), pipeline);
        Ok(())
    }

    fn replay(&mut self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            recording,
        } = frame;

        self.reserve_uniforms(recording.uniforms.len() as u64);
        if !recording.uniforms.is_empty() {
            self.queue
                .write_buffer(&self.uniforms.buffer, 0, &recording.uniforms);
        }

        let width = self.viewport.width.min(self.size.width).max(1);
        let height = self.viewport.height.min(self.size.height).max(1);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vantage frame encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vantage frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(recording.clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            for draw in &recording.draws {
                let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                    continue;
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(
                    UNIFORM_GROUP,
                    &self.uniforms.bind_group,
                    &[draw.uniform_offset],
                );
                if let Some(texture) = draw.texture.and_then(|t| self.textures.get(t.index())) {
                    rpass.set_bind_group(TEXTURE_GROUP, &texture.bind_group, &[]);
                }
                for (slot, buffer) in draw.buffers.iter().enumerate() {
                    if let Some(buffer) = self.buffers.get(buffer.index()) {
                        rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                    }
                }
                rpass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }
}

impl ShaderCompiler for Gpu<'_> {
    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, ShaderError> {
        let interface =
            reflect_stage(stage, source).map_err(|log| ShaderError::Compile { stage, log })?;

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "vantage vertex shader",
                    ShaderStage::Fragment => "vantage fragment shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        self.shaders.push(CompiledShader { module, interface });
        Ok(ShaderHandle::from_raw(self.shaders.len() as u32 - 1))
    }

    fn link(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError> {
        let lookup = |h: ShaderHandle| {
            self.shaders.get(h.index()).ok_or_else(|| ShaderError::Link {
                log: format!("unknown shader #{}", h.raw()),
            })
        };
        let vs = lookup(vertex)?;
        let fs = lookup(fragment)?;

        let interface =
            link_stages(&vs.interface, &fs.interface).map_err(|log| ShaderError::Link { log })?;

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> = if interface.samples_textures() {
            vec![&self.uniform_layout, &self.texture_layout]
        } else {
            vec![&self.uniform_layout]
        };
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("vantage program layout"),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        self.programs.push(LinkedProgram {
            vertex: vertex.index(),
            fragment: fragment.index(),
            interface,
            layout,
        });
        Ok(ProgramHandle::from_raw(self.programs.len() as u32 - 1))
    }

    fn location(&self, program: ProgramHandle, name: &str, kind: BindingKind) -> Option<Location> {
        self.programs
            .get(program.index())?
            .interface
            .location(name, kind)
            .map(Location)
    }
}

impl TextureLoader for Gpu<'_> {
    fn load(&mut self, source: &TextureSource) -> Result<TextureHandle, LoadError> {
        let max = self.device.limits().max_texture_dimension_2d;
        let image = texture::decode(source, max)?;

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let gpu_texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vantage texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vantage texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::info!(
            "loaded texture {} ({}x{})",
            source.describe(),
            image.width,
            image.height
        );
        self.textures.push(GpuTexture {
            _texture: gpu_texture,
            bind_group,
        });
        Ok(TextureHandle::from_raw(self.textures.len() as u32 - 1))
    }
}

impl RenderDevice for Gpu<'_> {
    fn create_vertex_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle, AllocationError> {
        let requested = bytes.len() as u64;
        if requested > self.max_buffer_size() {
            return Err(AllocationError::TooLarge {
                requested,
                max: self.max_buffer_size(),
            });
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("vantage vertex buffer"),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.push(buffer);
        Ok(BufferHandle::from_raw(self.buffers.len() as u32 - 1))
    }

    fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = winit::dpi::PhysicalSize::new(width, height);
        if width != self.size.width || height != self.size.height {
            self.resize(self.viewport);
        }
    }

    fn begin_frame(&mut self, clear: Color) -> Result<(), DeviceError> {
        // A frame abandoned before end_frame is dropped unpresented.
        self.frame = None;

        let surface_texture = self.acquire().map_err(|action| match action {
            SurfaceErrorAction::Fatal => DeviceError::OutOfMemory,
            other => DeviceError::Surface(other),
        })?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            recording: FrameRecording::new(clear.to_wgpu()),
        });
        Ok(())
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError> {
        self.program(program)?;
        self.recording()?.state.program = Some(program);
        Ok(())
    }

    fn bind_vertex_attribute(
        &mut self,
        location: Location,
        buffer: BufferHandle,
        attribute: VertexAttribute,
    ) -> Result<(), DeviceError> {
        if buffer.index() >= self.buffers.len() {
            return Err(DeviceError::UnknownHandle {
                kind: "buffer",
                index: buffer.raw(),
            });
        }
        vertex_format(attribute.components)?;
        if attribute.offset >= attribute.stride {
            return Err(DeviceError::invalid_state(format!(
                "attribute offset {} outside its {}-byte stride",
                attribute.offset, attribute.stride
            )));
        }
        self.recording()?
            .state
            .bind_attribute(location, buffer, attribute);
        Ok(())
    }

    fn set_uniform_mat4(
        &mut self,
        location: Location,
        value: &[f32; 16],
    ) -> Result<(), DeviceError> {
        let block = self.current_program()?.1.interface.uniforms.size;
        self.recording()?
            .state
            .write_uniform(location, bytemuck::cast_slice(value), block)
    }

    fn set_uniform_vec4(&mut self, location: Location, value: [f32; 4]) -> Result<(), DeviceError> {
        let block = self.current_program()?.1.interface.uniforms.size;
        self.recording()?
            .state
            .write_uniform(location, bytemuck::cast_slice(&value), block)
    }

    fn bind_texture(
        &mut self,
        unit: TextureUnit,
        texture: TextureHandle,
    ) -> Result<(), DeviceError> {
        if unit != TextureUnit::ZERO {
            return Err(DeviceError::invalid_state(format!(
                "only texture unit 0 is available, got {}",
                unit.0
            )));
        }
        if texture.index() >= self.textures.len() {
            return Err(DeviceError::UnknownHandle {
                kind: "texture",
                index: texture.raw(),
            });
        }
        self.recording()?.state.texture = Some(texture);
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        topology: Topology,
        first: u32,
        count: u32,
    ) -> Result<(), DeviceError> {
        let (program, linked) = self.current_program()?;
        let samples_textures = linked.interface.samples_textures();
        let state = &self
            .frame
            .as_ref()
            .ok_or_else(|| DeviceError::invalid_state("no frame in progress"))?
            .recording
            .state;

        let (attributes, buffers) = state.vertex_inputs(&linked.interface)?;
        let texture = if samples_textures {
            Some(
                state
                    .texture
                    .ok_or_else(|| DeviceError::invalid_state("program samples an unbound texture"))?,
            )
        } else {
            None
        };
        let end = first.checked_add(count).ok_or_else(|| {
            DeviceError::invalid_state(format!("vertex range {first}+{count} overflows"))
        })?;
        for (buffer, (_, attribute)) in buffers.iter().zip(&attributes) {
            let size = self.buffers[buffer.index()].size();
            let needed = (end as u64).saturating_sub(1) * attribute.stride as u64
                + attribute.offset as u64
                + attribute.components as u64 * 4;
            if count > 0 && needed > size {
                return Err(DeviceError::invalid_state(format!(
                    "draw of vertices {first}..{end} reads past the {size}-byte buffer"
                )));
            }
        }

        let key = PipelineKey {
            program,
            topology,
            attributes,
        };
        self.ensure_pipeline(&key)?;

        let recording = self.recording()?;
        let uniform_offset = recording.push_uniform_slot();
        recording.draws.push(RecordedDraw {
            pipeline: key,
            uniform_offset,
            buffers,
            texture,
            first,
            count,
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), DeviceError> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| DeviceError::invalid_state("end_frame without begin_frame"))?;
        self.replay(frame);
        Ok(())
    }
}
