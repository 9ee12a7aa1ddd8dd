use std::collections::HashMap;
use std::num::NonZeroU64;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::frame::{GpuFrame, PipelineKey};
use super::reflect::{ProgramInterface, StageInterface, UNIFORM_SLOT_SIZE};
use super::surface::{
    choose_alpha_mode, choose_present_mode, choose_surface_format, map_surface_error, DepthTarget,
};
use super::{GpuInit, SurfaceErrorAction};

const INITIAL_UNIFORM_SLOTS: u64 = 64;

pub(super) struct CompiledShader {
    pub module: wgpu::ShaderModule,
    pub interface: StageInterface,
}

pub(super) struct LinkedProgram {
    pub vertex: usize,
    pub fragment: usize,
    pub interface: ProgramInterface,
    pub layout: wgpu::PipelineLayout,
}

pub(super) struct GpuTexture {
    /// Keeps the storage alive for the bind group.
    pub _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Dynamic-offset uniform ring, one slot per draw.
pub(super) struct UniformSlots {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub capacity: u64,
}

impl UniformSlots {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, slots: u64) -> Self {
        let capacity = slots * UNIFORM_SLOT_SIZE as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vantage uniform slots"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vantage uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_SLOT_SIZE as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

/// Owns wgpu core objects, the surface and every resource handed out
/// through the device traits.
///
/// Handles are indices into the resource tables. Nothing is freed before
/// the context itself is dropped.
pub struct Gpu<'w> {
    /// Surface lifetime is tied to the window; the window must outlive `Gpu`.
    pub(super) surface: wgpu::Surface<'w>,
    pub(super) device: wgpu::Device,
    pub(super) queue: wgpu::Queue,
    pub(super) config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    pub(super) size: PhysicalSize<u32>,
    /// Viewport set by the renderer, clamped to `size` when recording.
    pub(super) viewport: PhysicalSize<u32>,

    pub(super) depth_format: wgpu::TextureFormat,
    pub(super) depth: DepthTarget,

    pub(super) uniform_layout: wgpu::BindGroupLayout,
    pub(super) texture_layout: wgpu::BindGroupLayout,
    pub(super) sampler: wgpu::Sampler,
    pub(super) uniforms: UniformSlots,

    pub(super) shaders: Vec<CompiledShader>,
    pub(super) programs: Vec<LinkedProgram>,
    pub(super) buffers: Vec<wgpu::Buffer>,
    pub(super) textures: Vec<GpuTexture>,
    pub(super) pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    pub(super) frame: Option<GpuFrame>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vantage device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format =
            choose_surface_format(&caps, init.prefer_srgb).context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: choose_present_mode(&caps, init.present_mode),
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface configured: {:?} {}x{} {:?}",
            config.format,
            config.width,
            config.height,
            config.present_mode
        );

        let depth = DepthTarget::new(&device, init.depth_format, size);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vantage uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_SLOT_SIZE as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vantage texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vantage texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let uniforms = UniformSlots::new(&device, &uniform_layout, INITIAL_UNIFORM_SLOTS);

        Ok(Gpu {
            surface,
            device,
            queue,
            config,
            size,
            viewport: size,
            depth_format: init.depth_format,
            depth,
            uniform_layout,
            texture_layout,
            sampler,
            uniforms,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            textures: Vec::new(),
            pipelines: HashMap::new(),
            frame: None,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface and depth target after a resize.
    ///
    /// wgpu does not support configuring a 0x0 surface; in that case only the
    /// recorded size changes and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthTarget::new(&self.device, self.depth_format, new_size);
    }

    /// Acquires the next surface texture.
    pub(super) fn acquire(&mut self) -> std::result::Result<wgpu::SurfaceTexture, SurfaceErrorAction> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(SurfaceErrorAction::SkipFrame);
        }
        self.surface.get_current_texture().map_err(|err| {
            log::debug!("surface acquisition failed: {err}");
            map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
        })
    }

    /// Grows the uniform ring to hold at least `bytes`.
    pub(super) fn reserve_uniforms(&mut self, bytes: u64) {
        if bytes <= self.uniforms.capacity {
            return;
        }
        let slots = bytes.div_ceil(UNIFORM_SLOT_SIZE as u64).next_power_of_two();
        log::debug!("growing uniform ring to {slots} slots");
        self.uniforms = UniformSlots::new(&self.device, &self.uniform_layout, slots);
    }
}
