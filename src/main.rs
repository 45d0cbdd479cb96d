mod lifecycle;

use anyhow::Result;
use clap::Parser;
use lifecycle::{Lifecycle, LifecycleEffect, LifecycleEvent};
use rotvec_config::{AppConfig, SensorConfig, SensorSource};
use rotvec_renderer::{FrameRenderer, GpuBackend, RenderError};
use rotvec_sensor::{orientation_channel, OrientationReader, SensorClient, SimulatedMotion};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Debug, Parser)]
#[command(name = "rotvec-app", version, about = "Render a cube oriented by a rotation-vector sensor")]
struct Args {
    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured sample source.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
    /// Override the sensor stream address (host:port).
    #[arg(long)]
    address: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SourceArg {
    Stream,
    Simulated,
    Idle,
}

impl From<SourceArg> for SensorSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Stream => SensorSource::Stream,
            SourceArg::Simulated => SensorSource::Simulated,
            SourceArg::Idle => SensorSource::Idle,
        }
    }
}

/// Application state.
struct App {
    config: AppConfig,
    sensor: SensorClient,
    orientation: OrientationReader,
    lifecycle: Lifecycle,
    renderer: FrameRenderer,
    window: Option<Arc<Window>>,
    gpu: Option<GpuBackend>,
}

impl App {
    fn new(config: AppConfig, sensor: SensorClient, orientation: OrientationReader) -> Self {
        let renderer = FrameRenderer::new(&config.render);
        Self {
            config,
            sensor,
            orientation,
            lifecycle: Lifecycle::new(),
            renderer,
            window: None,
            gpu: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();

        let mut gpu = GpuBackend::new(window.clone(), size.width, size.height, self.config.render.vsync)?;
        self.renderer.on_surface_created(&mut gpu)?;
        if let Err(e) = self.renderer.on_surface_resized(size.width, size.height, &mut gpu) {
            warn!(%e, "Initial surface size unusable, waiting for a resize");
        }

        self.window = Some(window);
        self.gpu = Some(gpu);
        info!(width = size.width, height = size.height, "Graphics initialized");
        Ok(())
    }

    fn apply_lifecycle(&mut self, event: LifecycleEvent) {
        match self.lifecycle.handle(event) {
            Some(LifecycleEffect::RegisterSensor) => {
                self.sensor.register(self.config.sensor.max_latency());
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Some(LifecycleEffect::UnregisterSensor) => self.sensor.unregister(),
            Some(LifecycleEffect::None) | None => {}
        }
        tracing::debug!(?event, state = ?self.lifecycle.state(), "Lifecycle event handled");
    }

    fn draw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let rotation = self.orientation.current().to_mat4();
        match self.renderer.on_draw_frame(rotation, gpu) {
            Ok(_) => {}
            Err(RenderError::Surface(e)) => warn!(?e, "Skipping frame"),
            Err(RenderError::NotConfigured) => {
                tracing::trace!("Surface not sized yet, skipping frame");
            }
            Err(e) => error!(%e, "Frame failed"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                error!(?e, "Failed to initialize graphics");
                event_loop.exit();
                return;
            }
        }
        self.apply_lifecycle(LifecycleEvent::Resume);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.apply_lifecycle(LifecycleEvent::Pause);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.apply_lifecycle(LifecycleEvent::Destroy);
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    if let Err(e) = self.renderer.on_surface_resized(size.width, size.height, gpu) {
                        warn!(%e, "Skipping resize");
                    }
                }
            }

            WindowEvent::Occluded(occluded) => {
                let event = if occluded {
                    LifecycleEvent::Pause
                } else {
                    LifecycleEvent::Resume
                };
                self.apply_lifecycle(event);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    self.apply_lifecycle(LifecycleEvent::Destroy);
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                // Paused views keep their last frame; drawing resumes with the next Resume.
                if !self.lifecycle.is_active() {
                    return;
                }
                self.draw();

                // Request next frame.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Start the configured sample source. A stream that cannot be reached
/// falls back to an idle source so the app still opens.
async fn start_sensor(config: &SensorConfig) -> (SensorClient, OrientationReader) {
    let (source, reader) = orientation_channel();
    match config.source {
        SensorSource::Stream => match SensorClient::connect(&config.address, source).await {
            Ok(client) => (client, reader),
            Err(e) => {
                warn!(?e, address = %config.address, "Sensor stream not available, orientation stays fixed");
                let (source, reader) = orientation_channel();
                (SensorClient::idle(source), reader)
            }
        },
        SensorSource::Simulated => {
            let motion = SimulatedMotion::new(config.simulated_axis, config.simulated_degrees_per_second);
            (SensorClient::simulated(motion, source), reader)
        }
        SensorSource::Idle => (SensorClient::idle(source), reader),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rotvec_app=info,rotvec_sensor=info,rotvec_renderer=info,rotvec_config=info".into()
            }),
        )
        .init();

    let args = Args::parse();
    info!("Rotation vector cube starting");

    let loaded = match &args.config {
        Some(path) => rotvec_config::load_config_from(path),
        None => rotvec_config::load_config(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(source) = args.source {
        config.sensor.source = source.into();
    }
    if let Some(address) = args.address {
        config.sensor.address = address;
    }
    config.validate()?;

    info!(source = ?config.sensor.source, "Config loaded");

    let (sensor, orientation) = start_sensor(&config.sensor).await;

    // Run the application.
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, sensor, orientation);
    event_loop.run_app(&mut app)?;

    Ok(())
}
