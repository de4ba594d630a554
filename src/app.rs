// src/app.rs

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::gfx::SurfaceRenderer;
use crate::simulation::GpuLifeEngine;

/// Settings for a windowed simulation run.
#[derive(Debug, Clone)]
pub struct LifeConfig {
    /// Grid dimension N; the simulation domain is N x N.
    pub grid_size: u32,
    /// Probability that a cell starts alive, for seeding and resets.
    pub seed_probability: f64,
    /// Tick rate cap. Zero pauses the simulation while still drawing.
    pub generations_per_second: f32,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_size: 256,
            seed_probability: 0.3,
            generations_per_second: 30.0,
        }
    }
}

/// Windowed Game of Life application.
///
/// Owns the event loop and drives the engine one tick at a time: advance,
/// then draw the resulting snapshot. Escape quits, space re-seeds.
pub struct PetriApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: LifeConfig,
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    engine: Option<GpuLifeEngine>,
    last_tick: Instant,
}

impl PetriApp {
    /// Create a new application with the given settings
    pub fn new(config: LifeConfig) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                renderer: None,
                engine: None,
                last_tick: Instant::now(),
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl AppState {
    /// Advances the simulation when the tick interval has elapsed, then
    /// draws whatever generation is current. Any engine error stops the
    /// run rather than presenting stale frames.
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(engine)) = (self.renderer.as_mut(), self.engine.as_mut()) else {
            return;
        };

        if self.config.generations_per_second > 0.0 {
            let seconds_per_generation = 1.0 / self.config.generations_per_second;
            if self.last_tick.elapsed().as_secs_f32() >= seconds_per_generation {
                match engine.advance() {
                    Ok(_) => self.last_tick = Instant::now(),
                    Err(e) => {
                        log::error!("advance failed, stopping: {e}");
                        event_loop.exit();
                        return;
                    }
                }
            }
        }

        renderer.draw(&engine.snapshot());
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("petri")
            .with_inner_size(winit::dpi::LogicalSize::new(800, 800));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let window_handle = Arc::new(window);
        self.window = Some(window_handle.clone());

        let (width, height) = window_handle.inner_size().into();
        let grid_size = self.config.grid_size;

        let window_clone = window_handle.clone();
        let renderer = pollster::block_on(async move {
            SurfaceRenderer::new(window_clone, width, height, grid_size).await
        });
        let renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("failed to initialize renderer: {e}");
                event_loop.exit();
                return;
            }
        };

        let engine = GpuLifeEngine::new(
            renderer.device().clone(),
            renderer.queue().clone(),
            self.config.grid_size,
            self.config.seed_probability,
        );
        match engine {
            Ok(engine) => self.engine = Some(engine),
            Err(e) => {
                log::error!("failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        }

        self.renderer = Some(renderer);
        self.last_tick = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                winit::keyboard::KeyCode::Escape => event_loop.exit(),
                winit::keyboard::KeyCode::Space => {
                    if let Some(engine) = self.engine.as_mut() {
                        if let Err(e) = engine.reset(self.config.seed_probability) {
                            log::error!("reset failed: {e}");
                            event_loop.exit();
                        }
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.tick(event_loop);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
