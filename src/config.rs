//! Viewer configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file overrides any subset of them, and command-line
//! flags override both.
//!
//! ## Config File Location
//!
//! `--config PATH` names a file explicitly. Otherwise the viewer looks for
//! `ringview/config.toml` in the platform config directory (`dirs`:
//! `$XDG_CONFIG_HOME` or `~/.config` on Linux). A missing file just means
//! stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [view]
//! scale_mode = "normal"     # normal | fullsize | img-ratio | screen-ratio | fullscreen
//! scale_ratio = 1.0         # zoom multiplier for the ratio modes
//! display_mode = "normal"   # normal | presentation
//!
//! [slideshow]
//! delay_seconds = 0         # 0 = off
//!
//! [screen]
//! width = 1920              # monitor size used to fit images
//! height = 1080
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [view]
//! scale_mode = "fullscreen"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Dimensions, ScaleMode, ScaleRatio};
use crate::session::{DisplayMode, ViewSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Viewer configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// How images are sized and how the window is placed.
    pub view: ViewConfig,
    /// Automatic advance.
    pub slideshow: SlideshowConfig,
    /// Monitor size used when the front end can't ask the display.
    pub screen: ScreenConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub scale_mode: ScaleMode,
    pub scale_ratio: f64,
    pub display_mode: DisplayMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            scale_mode: ScaleMode::Normal,
            scale_ratio: 1.0,
            display_mode: DisplayMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideshowConfig {
    /// Seconds between slides; 0 disables the slideshow.
    pub delay_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.view.scale_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::Validation(
                "view.scale_ratio must be a positive number".into(),
            ));
        }
        if !(ScaleRatio::MIN..=ScaleRatio::MAX).contains(&ratio) {
            return Err(ConfigError::Validation(format!(
                "view.scale_ratio must be between {} and {}",
                ScaleRatio::MIN,
                ScaleRatio::MAX
            )));
        }
        let delay = self.slideshow.delay_seconds;
        if !delay.is_finite() || delay < 0.0 {
            return Err(ConfigError::Validation(
                "slideshow.delay_seconds must be zero or more".into(),
            ));
        }
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(ConfigError::Validation(
                "screen.width and screen.height must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            scale_mode: self.view.scale_mode,
            scale_ratio: ScaleRatio::new(self.view.scale_ratio),
            display_mode: self.view.display_mode,
        }
    }

    pub fn slideshow_delay(&self) -> Duration {
        Duration::from_secs_f64(self.slideshow.delay_seconds)
    }

    pub fn screen_size(&self) -> Dimensions {
        Dimensions::new(self.screen.width, self.screen.height)
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ViewerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ViewerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ViewerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ViewerConfig, ConfigError> {
    load_config_file(&dir.join("config.toml"))
}

/// Load config from an explicit file path, on top of stock defaults.
pub fn load_config_file(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// `ringview` under the platform config directory, if there is one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ringview"))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Printed by `--print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# ringview configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Image sizing
# ---------------------------------------------------------------------------
[view]
# How big each image is shown:
#   normal        true size, shrunk to fit the screen if too big
#   fullsize      true size, even if bigger than the screen
#   img-ratio     true size times scale_ratio
#   screen-ratio  like normal, times scale_ratio
#   fullscreen    larger side fills the screen, enlarging if needed
scale_mode = "normal"

# Zoom multiplier for img-ratio and screen-ratio (1/32 to 32).
scale_ratio = 1.0

# normal: window sized to the image. presentation: full screen, black border.
display_mode = "normal"

# ---------------------------------------------------------------------------
# Slideshow
# ---------------------------------------------------------------------------
[slideshow]
# Seconds between images. 0 turns the slideshow off.
delay_seconds = 0.0

# ---------------------------------------------------------------------------
# Screen
# ---------------------------------------------------------------------------
[screen]
# Monitor size in pixels; images are fitted to this.
width = 1920
height = 1080
"##
}
