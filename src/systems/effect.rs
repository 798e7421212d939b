//! Effect system
//!
//! Owns the raindrop effect for the window and feeds it frames from the
//! winit loop through a [`HostScheduler`].

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use raindrop_core::{Background, FxError, HostScheduler, RaindropFx};
use raindrop_render::{RaindropRenderer, WindowCanvas};
use raindrop_sim::RaindropSimulator;
use winit::window::Window;

use crate::config::AppConfig;

/// The effect as driven by the application
pub type WindowEffect = RaindropFx<RaindropSimulator, RaindropRenderer>;

/// Round-robin over the configured backgrounds
#[derive(Debug, Clone)]
pub struct BackgroundCycle {
    backgrounds: Vec<Background>,
    current: usize,
}

impl BackgroundCycle {
    pub fn new(backgrounds: Vec<Background>) -> Self {
        Self {
            backgrounds,
            current: 0,
        }
    }

    pub fn current(&self) -> Option<&Background> {
        self.backgrounds.get(self.current)
    }

    /// Move to the next background, wrapping around
    pub fn advance(&mut self) -> Option<&Background> {
        if self.backgrounds.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.backgrounds.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.backgrounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backgrounds.is_empty()
    }
}

/// Runs the raindrop effect inside the host window
pub struct EffectSystem {
    fx: WindowEffect,
    scheduler: Rc<HostScheduler>,
    epoch: Instant,
    backgrounds: BackgroundCycle,
}

impl EffectSystem {
    /// Create the effect over `window`; frame requests wake the window
    pub fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self, FxError> {
        let canvas = WindowCanvas::new(window);
        let scheduler = Rc::new(HostScheduler::new());
        let redraw = canvas.clone();
        scheduler.set_frame_requested_hook(move || redraw.request_redraw());

        let options = config.fx_options(canvas);
        let fx = WindowEffect::new(options, scheduler.clone())?;

        Ok(Self {
            fx,
            scheduler,
            epoch: Instant::now(),
            backgrounds: BackgroundCycle::new(config.effect.backgrounds()),
        })
    }

    /// Load assets and start the animation
    pub fn start(&self) -> Result<(), FxError> {
        pollster::block_on(self.fx.start())
    }

    /// Pause a running effect or resume a stopped one
    pub fn toggle(&self) -> Result<bool, FxError> {
        if self.fx.is_running() {
            self.fx.stop();
            log::info!("Effect paused");
        } else {
            self.start()?;
            log::info!("Effect resumed");
        }
        Ok(self.fx.is_running())
    }

    /// Forward a window resize; minimized (zero-sized) windows are ignored
    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.fx.resize(width, height);
    }

    /// Switch to the next configured background
    pub fn next_background(&mut self) -> Result<(), FxError> {
        let Some(background) = self.backgrounds.advance().cloned() else {
            return Ok(());
        };
        log::info!("Switching background to {}", background);
        pollster::block_on(self.fx.set_background(background))
    }

    /// Run the frame the effect asked for, if any
    pub fn run_frame(&self) -> usize {
        self.scheduler.run_frame(self.epoch.elapsed())
    }

    pub fn is_running(&self) -> bool {
        self.fx.is_running()
    }

    pub fn drop_count(&self) -> usize {
        self.fx.simulator().drop_count()
    }

    pub fn destroy(&self) {
        self.fx.destroy();
    }
}
