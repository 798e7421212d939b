//! Contracts for the simulator and renderer driven by the orchestrator

use futures::future::LocalBoxFuture;

use crate::clock::FrameClock;
use crate::error::{AssetError, RenderError};
use crate::options::{Background, Canvas, RenderOptions, SimulatorOptions, Viewport};

/// Future returned by the renderer's loading operations
///
/// It owns everything it needs, so the orchestrator can await it without
/// keeping the renderer borrowed across the suspension.
pub type LoadFuture = LocalBoxFuture<'static, Result<(), AssetError>>;

/// Particle simulation advanced once per frame
pub trait Simulator {
    /// Build a simulator for the given viewport
    fn new(options: &SimulatorOptions, viewport: Viewport) -> Self
    where
        Self: Sized;

    /// Advance internal particle state
    fn update(&mut self, clock: FrameClock);

    /// The visible area changed size
    fn resize(&mut self, _viewport: Viewport) {}

    /// Release anything held outside the simulator
    fn destroy(&mut self) {}
}

/// Draws simulator state over a background
pub trait Renderer<S: ?Sized> {
    /// Surface this renderer draws into
    type Canvas: Canvas + Clone;

    /// Build a renderer for a canvas; no assets are loaded yet
    fn new(canvas: Self::Canvas, options: &RenderOptions, viewport: Viewport) -> Result<Self, RenderError>
    where
        Self: Sized;

    /// Load textures, shaders and the initial background
    fn load_assets(&mut self) -> LoadFuture;

    /// Adjust the surface to a new size
    fn resize(&mut self, width: u32, height: u32);

    /// Replace the background in [`options`](Self::options); takes effect on reload
    fn set_background(&mut self, background: Background);

    /// Load and apply the background currently set in the options
    fn reload_background(&mut self) -> LoadFuture;

    /// Draw one frame
    fn render(&mut self, simulator: &S, clock: FrameClock);

    /// Options currently applied by the renderer
    fn options(&self) -> &RenderOptions;

    /// Release GPU resources; called at most once
    fn destroy(&mut self);
}
