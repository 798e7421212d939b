//! Effect configuration
//!
//! [`FxOptions`] is what a caller hands to [`RaindropFx::new`](crate::RaindropFx::new).
//! It is resolved once into an [`FxConfig`], which the orchestrator owns and
//! mutates in place on `resize` and `set_background`. Collaborators never see
//! the config itself, only copies of the slices they need.

use std::fmt;
use std::path::PathBuf;

use raindrop_math::Rect;
use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_MAX_FRAME_DT;
use crate::error::FxError;

/// A render target that can report its pixel size
pub trait Canvas {
    /// Current size in physical pixels (width, height)
    fn size(&self) -> (u32, u32);
}

/// Visible area of the canvas the effect draws into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bounds in pixel space, anchored at the origin
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width as f32, self.height as f32)
    }
}

/// What sits behind the rain
///
/// Built from a source string: `#rrggbb` or `#rrggbbaa` is a solid color,
/// anything else is treated as an image path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Background {
    /// Solid RGBA color (components in 0..=1)
    Color([f32; 4]),
    /// Image file on disk
    Image(PathBuf),
}

impl Background {
    /// Parse a background source string
    pub fn from_source(source: &str) -> Self {
        parse_hex_color(source)
            .map(Background::Color)
            .unwrap_or_else(|| Background::Image(PathBuf::from(source)))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Background::Image(_))
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Color([0.05, 0.06, 0.09, 1.0])
    }
}

impl From<&str> for Background {
    fn from(source: &str) -> Self {
        Self::from_source(source)
    }
}

impl From<String> for Background {
    fn from(source: String) -> Self {
        Self::from_source(&source)
    }
}

impl From<Background> for String {
    fn from(background: Background) -> Self {
        background.to_string()
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Color(rgba) => {
                let [r, g, b, a] = rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                if a == 255 {
                    write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
                } else {
                    write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
                }
            }
            Background::Image(path) => write!(f, "{}", path.display()),
        }
    }
}

fn parse_hex_color(source: &str) -> Option<[f32; 4]> {
    let hex = source.strip_prefix('#')?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Options passed through to the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorOptions {
    /// New drops per second
    pub spawn_rate: f32,
    /// Smallest drop radius in pixels (smaller drops evaporate)
    pub min_radius: f32,
    /// Largest spawned drop radius in pixels
    pub max_radius: f32,
    /// Downward acceleration in pixels per second squared
    pub gravity: f32,
    /// Velocity damping per second from friction with the glass
    pub friction: f32,
    /// Maximum falling speed in pixels per second
    pub terminal_velocity: f32,
    /// Radius below which a drop sticks to the glass instead of sliding
    pub slide_threshold: f32,
    /// Upper bound on live drops
    pub max_drops: usize,
    /// Merge overlapping drops
    pub merge: bool,
    /// Fixed RNG seed (random if unset)
    pub seed: Option<u64>,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            spawn_rate: 40.0,
            min_radius: 3.0,
            max_radius: 14.0,
            gravity: 900.0,
            friction: 2.5,
            terminal_velocity: 650.0,
            slide_threshold: 7.0,
            max_drops: 600,
            merge: true,
            seed: None,
        }
    }
}

/// Options passed through to the renderer
///
/// `background` mirrors the configuration's background; the orchestrator
/// keeps it in sync through [`Renderer::set_background`](crate::Renderer::set_background).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Background the drops are drawn over; set from the effect's
    /// background, never read from a config section
    #[serde(skip)]
    pub background: Background,
    /// Drop tint (RGBA)
    pub drop_color: [f32; 4],
    /// Width of the soft edge as a fraction of the drop radius
    pub edge_softness: f32,
    /// Brightness of the specular highlight on each drop
    pub highlight: f32,
    /// Background dimming applied under the rain (0 = none)
    pub background_dim: f32,
    /// Synchronize presentation with the display
    pub vsync: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: Background::default(),
            drop_color: [0.75, 0.85, 1.0, 0.55],
            edge_softness: 0.25,
            highlight: 0.6,
            background_dim: 0.1,
            vsync: true,
        }
    }
}

/// Construction options for [`RaindropFx`](crate::RaindropFx)
///
/// Only `canvas` is required. Size and viewport default to the canvas size.
#[derive(Debug, Clone)]
pub struct FxOptions<C> {
    pub canvas: Option<C>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub viewport: Option<Viewport>,
    pub background: Background,
    /// Upper bound on a single frame's `dt` in seconds
    pub max_frame_dt: f32,
    pub simulator: SimulatorOptions,
    pub renderer: RenderOptions,
}

impl<C> Default for FxOptions<C> {
    fn default() -> Self {
        Self {
            canvas: None,
            width: None,
            height: None,
            viewport: None,
            background: Background::default(),
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            simulator: SimulatorOptions::default(),
            renderer: RenderOptions::default(),
        }
    }
}

impl<C: Canvas> FxOptions<C> {
    /// Options for a canvas with a starting background
    pub fn new(canvas: C, background: impl Into<Background>) -> Self {
        Self {
            canvas: Some(canvas),
            background: background.into(),
            ..Self::default()
        }
    }

    /// Override the size (defaults to the canvas size)
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_max_frame_dt(mut self, max_frame_dt: f32) -> Self {
        self.max_frame_dt = max_frame_dt;
        self
    }

    pub fn with_simulator(mut self, simulator: SimulatorOptions) -> Self {
        self.simulator = simulator;
        self
    }

    pub fn with_renderer(mut self, renderer: RenderOptions) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validate and fill defaults
    pub fn resolve(self) -> Result<FxConfig<C>, FxError> {
        let canvas = self.canvas.ok_or(FxError::MissingCanvas)?;

        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            return Err(FxError::InvalidOptions(format!(
                "max_frame_dt must be positive, got {}",
                self.max_frame_dt
            )));
        }
        let sim = &self.simulator;
        let floats = [
            ("spawn_rate", sim.spawn_rate),
            ("min_radius", sim.min_radius),
            ("max_radius", sim.max_radius),
            ("gravity", sim.gravity),
            ("friction", sim.friction),
            ("terminal_velocity", sim.terminal_velocity),
            ("slide_threshold", sim.slide_threshold),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return Err(FxError::InvalidOptions(format!(
                "simulator.{} must be finite, got {}",
                name, value
            )));
        }
        if sim.min_radius <= 0.0 || sim.min_radius > sim.max_radius {
            return Err(FxError::InvalidOptions(format!(
                "drop radius range {}..{} is empty",
                sim.min_radius, sim.max_radius
            )));
        }
        if sim.spawn_rate < 0.0 {
            return Err(FxError::InvalidOptions("spawn_rate must not be negative".to_string()));
        }

        let (canvas_width, canvas_height) = canvas.size();
        let width = self.width.unwrap_or(canvas_width);
        let height = self.height.unwrap_or(canvas_height);
        if width == 0 || height == 0 {
            return Err(FxError::InvalidOptions(format!(
                "size must be non-zero, got {}x{}",
                width, height
            )));
        }
        let viewport = self.viewport.unwrap_or(Viewport::new(width, height));

        let mut renderer = self.renderer;
        renderer.background = self.background.clone();

        Ok(FxConfig {
            canvas,
            width,
            height,
            viewport,
            background: self.background,
            max_frame_dt: self.max_frame_dt,
            simulator: self.simulator,
            renderer,
        })
    }
}

/// Resolved configuration owned by the orchestrator
#[derive(Debug, Clone)]
pub struct FxConfig<C> {
    pub canvas: C,
    pub width: u32,
    pub height: u32,
    pub viewport: Viewport,
    pub background: Background,
    pub max_frame_dt: f32,
    pub simulator: SimulatorOptions,
    pub renderer: RenderOptions,
}

impl<C> FxConfig<C> {
    /// Update the size and the viewport together
    pub(crate) fn set_size(&mut self, width: u32, height: u32) -> Viewport {
        self.width = width;
        self.height = height;
        self.viewport.width = width;
        self.viewport.height = height;
        self.viewport
    }

    /// Update the background and its renderer mirror together
    pub(crate) fn set_background(&mut self, background: Background) {
        self.renderer.background = background.clone();
        self.background = background;
    }
}
