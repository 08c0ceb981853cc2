use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::types::Viewport;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_viewport")]
    pub viewport: Viewport,
    pub capture: CaptureSettings,
    pub text: TextSettings,
    pub theme: ThemeSettings,
    pub icons: IconSettings,
    pub browser: BrowserSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureSettings {
    /// Wait after every theme write before sampling geometry.
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    /// Wait before the working document is detached after text layout.
    #[serde(with = "humantime_serde")]
    pub detach_delay: Duration,
    /// Skip the dark pass entirely.
    pub debug_light_only: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            detach_delay: Duration::ZERO,
            debug_light_only: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSettings {
    pub tolerance_px: f32,
    pub default_line_height_factor: f32,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            tolerance_px: 2.0,
            default_line_height_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeSettings {
    /// Font families at or below this length are left inline.
    pub font_family_min_len: usize,
    /// Longer derived variable names fall back to a digest.
    pub max_variable_name_len: usize,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            font_family_min_len: 12,
            max_variable_name_len: 48,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconSettings {
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserSettings {
    pub node_command: Option<String>,
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub process_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            node_command: None,
            navigation_timeout: Duration::from_secs(30),
            process_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(#[from] toml::de::Error),
}

fn deserialize_viewport<'de, D>(deserializer: D) -> Result<Viewport, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// `~/.config/domsvg/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").filter(|h| !h.is_empty())?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("domsvg")
                .join("config.toml"),
        )
    }

    /// Priority: explicit path > central config (if it exists) > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::central_config_path() {
                Some(central) if central.is_file() => Self::from_file(&central),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.capture.settle_delay > Duration::from_secs(60) {
            return Err("capture.settle_delay must be at most 60s".to_string());
        }
        if !(self.text.tolerance_px >= 0.0) {
            return Err("text.tolerance_px must be non-negative".to_string());
        }
        if !(self.text.default_line_height_factor > 0.0) {
            return Err("text.default_line_height_factor must be positive".to_string());
        }
        if self.theme.max_variable_name_len < 16 {
            return Err("theme.max_variable_name_len must be at least 16".to_string());
        }
        if self.icons.fetch_timeout.is_zero() {
            return Err("icons.fetch_timeout must be positive".to_string());
        }
        if self.browser.navigation_timeout.is_zero() || self.browser.process_timeout.is_zero() {
            return Err("browser timeouts must be positive".to_string());
        }
        if let Some(cmd) = &self.browser.node_command {
            if cmd.trim().is_empty() {
                return Err("browser.node_command must not be empty".to_string());
            }
        }
        Ok(())
    }
}
