//! Raindrop FX
//!
//! Opens a window and animates raindrops running down it.
//!
//! Keys: Space pauses/resumes, B cycles backgrounds, F toggles fullscreen,
//! Escape tears the effect down and exits.

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use raindrop_fx::config::AppConfig;
use raindrop_fx::systems::{EffectSystem, WindowSystem};

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    window: Option<WindowSystem>,
    effect: Option<EffectSystem>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            effect: None,
        }
    }

    fn refresh_title(&self) {
        if let (Some(window), Some(effect)) = (&self.window, &self.effect) {
            let count = self
                .config
                .debug
                .show_drop_count
                .then(|| effect.drop_count());
            window.update_title(effect.is_running(), count);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(effect) = self.effect.take() {
            effect.destroy();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let effect = match EffectSystem::new(window.window().clone(), &self.config) {
            Ok(effect) => effect,
            Err(e) => {
                log::error!("Failed to create effect: {}", e);
                event_loop.exit();
                return;
            }
        };

        if self.config.effect.autostart {
            if let Err(e) = effect.start() {
                log::error!("Failed to start effect: {}", e);
            }
        }

        self.window = Some(window);
        self.effect = Some(effect);
        self.refresh_title();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(effect) = &self.effect {
                    effect.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(key) = event.physical_key else {
                    return;
                };
                match key {
                    KeyCode::Escape => {
                        self.shutdown(event_loop);
                        return;
                    }
                    KeyCode::Space => {
                        if let Some(effect) = &self.effect {
                            if let Err(e) = effect.toggle() {
                                log::error!("Failed to resume effect: {}", e);
                            }
                        }
                    }
                    KeyCode::KeyB => {
                        if let Some(effect) = &mut self.effect {
                            if let Err(e) = effect.next_background() {
                                log::warn!("{}", e);
                            }
                        }
                    }
                    KeyCode::KeyF => {
                        if let Some(window) = &self.window {
                            window.toggle_fullscreen();
                        }
                    }
                    _ => {}
                }
                self.refresh_title();
            }

            WindowEvent::RedrawRequested => {
                if let Some(effect) = &self.effect {
                    effect.run_frame();
                }
                if self.config.debug.show_drop_count {
                    self.refresh_title();
                }
            }

            _ => {}
        }
    }
}

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    log::info!("Starting Raindrop FX");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    // Frames are requested by the effect itself
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
