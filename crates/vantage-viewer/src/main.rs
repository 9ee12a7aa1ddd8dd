use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use vantage_engine::core::{Renderer, RendererConfig};
use vantage_engine::device::GpuInit;
use vantage_engine::logging::{init_logging, LoggingConfig};
use vantage_engine::scene::{SceneKind, TextureSource};
use vantage_engine::window::{Runtime, RuntimeConfig};

/// Built-in scene to render.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SceneArg {
    /// Textured cube with an orbiting camera.
    Cube,
    /// Colored axes and a spinning triangle.
    Axes,
}

impl From<SceneArg> for SceneKind {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Cube => SceneKind::TexturedCube,
            SceneArg::Axes => SceneKind::AxesTriangle,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Parser, Debug)]
#[command(name = "vantage-viewer", version, about = "Minimal real-time 3D scene viewer")]
struct Args {
    #[arg(long, value_enum, default_value_t = SceneArg::Cube)]
    scene: SceneArg,

    /// Length of one rotation/orbit cycle in milliseconds.
    #[arg(long)]
    period_ms: Option<u64>,

    /// PNG or JPEG image replacing the cube's procedural texture.
    #[arg(long)]
    texture: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// env_logger filter, e.g. "debug" or "vantage_engine=debug,wgpu=warn".
    #[arg(long)]
    log: Option<String>,

    #[arg(long, value_enum, default_value_t = Toggle::On)]
    vsync: Toggle,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let kind = SceneKind::from(args.scene);
    let mut scene = kind.build();
    if let Some(path) = args.texture {
        scene = scene.with_texture(0, TextureSource::File(path));
    }
    log::info!("starting {} scene", kind.name());

    let renderer = Renderer::new(
        scene,
        RendererConfig {
            period_ms: args.period_ms,
            ..Default::default()
        },
    );

    Runtime::run(
        RuntimeConfig {
            title: format!("vantage - {}", kind.name()),
            initial_size: LogicalSize::new(args.width, args.height),
        },
        GpuInit::default().with_vsync(matches!(args.vsync, Toggle::On)),
        renderer,
    )
}
