//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`RAIN_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use raindrop_core::{Background, Canvas, FxOptions, RenderOptions, SimulatorOptions, DEFAULT_MAX_FRAME_DT};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Effect configuration (backgrounds, frame timing)
    #[serde(default)]
    pub effect: EffectConfig,
    /// Raindrop simulation
    #[serde(default)]
    pub simulator: SimulatorOptions,
    /// Drawing options
    #[serde(default)]
    pub renderer: RenderOptions,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`RAIN_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // RAIN_EFFECT__BACKGROUND=#202830 -> effect.background = "#202830"
        figment = figment.merge(Env::prefixed("RAIN_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Effect options for `canvas`, sized from the canvas
    pub fn fx_options<C: Canvas>(&self, canvas: C) -> FxOptions<C> {
        FxOptions::new(canvas, self.effect.background.clone())
            .with_max_frame_dt(self.effect.max_frame_dt)
            .with_simulator(self.simulator.clone())
            .with_renderer(self.renderer.clone())
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Raindrop FX".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Effect configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Background shown at startup (image path or `#rrggbb[aa]`)
    pub background: Background,
    /// Further backgrounds to cycle through
    pub alternates: Vec<Background>,
    /// Longest simulated step in seconds
    pub max_frame_dt: f32,
    /// Start the animation as soon as the window opens
    pub autostart: bool,
}

impl EffectConfig {
    /// The startup background followed by the alternates
    pub fn backgrounds(&self) -> Vec<Background> {
        std::iter::once(self.background.clone())
            .chain(self.alternates.iter().cloned())
            .collect()
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            background: Background::default(),
            alternates: Vec::new(),
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            autostart: true,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace) used when RUST_LOG is unset
    pub log_level: String,
    /// Show the live drop count in the window title
    pub show_drop_count: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_drop_count: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct FixedCanvas;

    impl Canvas for FixedCanvas {
        fn size(&self) -> (u32, u32) {
            (640, 480)
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.simulator.spawn_rate, 40.0);
        assert!(config.effect.autostart);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("title"));
        assert!(toml.contains("spawn_rate"));
        assert!(toml.contains("background"));
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [effect]
            background = "#102030"

            [simulator]
            gravity = 500.0
            "##,
        )
        .unwrap();
        assert_eq!(config.effect.background, Background::from("#102030"));
        assert_eq!(config.effect.max_frame_dt, DEFAULT_MAX_FRAME_DT);
        assert_eq!(config.simulator.gravity, 500.0);
        assert_eq!(config.simulator.max_drops, SimulatorOptions::default().max_drops);
    }

    #[test]
    fn test_renderer_section_has_no_background_key() {
        let config: AppConfig = toml::from_str(
            r##"
            [effect]
            background = "#102030"

            [renderer]
            background = "ignored.png"
            highlight = 0.2
            "##,
        )
        .unwrap();
        assert_eq!(config.renderer.highlight, 0.2);
        assert_eq!(config.renderer.background, Background::default());
        assert!(!toml::to_string(&config.renderer).unwrap().contains("background ="));

        let resolved = config.fx_options(FixedCanvas).resolve().unwrap();
        assert_eq!(resolved.renderer.background, Background::from("#102030"));
    }

    #[test]
    fn test_backgrounds_lists_startup_first() {
        let effect = EffectConfig {
            background: Background::from("a.png"),
            alternates: vec![Background::from("b.png"), Background::from("#000000")],
            ..EffectConfig::default()
        };
        let backgrounds = effect.backgrounds();
        assert_eq!(backgrounds.len(), 3);
        assert_eq!(backgrounds[0], Background::from("a.png"));
    }

    #[test]
    fn test_fx_options_carry_sections() {
        let mut config = AppConfig::default();
        config.effect.background = Background::from("glass.jpg");
        config.effect.max_frame_dt = 0.1;
        config.simulator.seed = Some(3);

        let resolved = config.fx_options(FixedCanvas).resolve().unwrap();
        assert_eq!(resolved.background, Background::from("glass.jpg"));
        assert_eq!(resolved.renderer.background, Background::from("glass.jpg"));
        assert_eq!(resolved.max_frame_dt, 0.1);
        assert_eq!(resolved.simulator.seed, Some(3));
        assert_eq!((resolved.width, resolved.height), (640, 480));
    }
}
