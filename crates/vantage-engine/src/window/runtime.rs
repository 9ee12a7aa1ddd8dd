use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::Renderer;
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vantage".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `renderer` until the window closes.
    ///
    /// Setup failures and fatal device errors end the loop and are returned.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, renderer: Renderer) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host::new(config, gpu_init, renderer);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        match host.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Window plus the GPU context bound to it.
#[self_referencing]
struct SurfaceEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct Host {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer: Renderer,

    surface: Option<SurfaceEntry>,
    failure: Option<anyhow::Error>,
}

impl Host {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer: Renderer) -> Self {
        Self {
            config,
            gpu_init,
            renderer,
            surface: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.surface = None;
        event_loop.exit();
    }

    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = SurfaceEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let renderer = &mut self.renderer;
        entry
            .with_mut(|fields| {
                let viewport = Viewport::from(fields.window.inner_size());
                fields.clock.reset();
                renderer.on_create(fields.gpu, viewport)
            })
            .with_context(|| format!("failed to set up scene {}", renderer.scene().name))?;

        entry.with_window(|w| w.request_redraw());
        self.surface = Some(entry);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(entry) = self.surface.as_mut() else {
            return;
        };
        let renderer = &mut self.renderer;
        entry.with_gpu_mut(|gpu| {
            gpu.resize(size);
            // Rejected sizes are logged by the renderer and keep the old projection.
            let _ = renderer.on_resize(gpu, size.width, size.height);
        });
        entry.with_window(|w| w.request_redraw());
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.surface.as_mut() else {
            return;
        };
        let renderer = &mut self.renderer;
        let report = entry.with_mut(|fields| {
            let now_ms = fields.clock.tick().now_ms();
            renderer.on_frame(fields.gpu, now_ms)
        });

        if report.is_fatal() {
            let err = report
                .error()
                .map(|e| anyhow!("GPU device can no longer render: {e}"))
                .unwrap_or_else(|| anyhow!("GPU device can no longer render"));
            self.fail(event_loop, err);
        }
    }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(e) = self.create_surface(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // The surface and every GPU object built for it go together.
        if self.surface.take().is_some() {
            log::info!("surface suspended; GPU resources released");
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous animation.
        if let Some(entry) = &self.surface {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.surface = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self
                    .surface
                    .as_ref()
                    .map(|e| e.with_window(|w| w.inner_size()))
                {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
