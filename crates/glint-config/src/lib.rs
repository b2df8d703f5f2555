//! Glint configuration
//!
//! Settings for the platform layer are loaded from `glint.toml`, with
//! environment variables taking precedence for temporary overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlintConfig {
    /// Backend and default window settings
    pub window: WindowConfig,
    /// Event translation settings
    pub events: EventConfig,
    /// Font and text settings
    pub text: TextConfig,
}

/// Which event/window backend a `System` starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Native windows through winit; `System::from_config` reports the
    /// backend as unavailable when winit support is compiled out.
    #[default]
    Native,
    /// No native windows; events come only from `queue_event` and injectors.
    Headless,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "native" | "winit" => Some(BackendKind::Native),
            "headless" | "none" => Some(BackendKind::Headless),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub backend: BackendKind,
    /// Title used when a window spec does not set one
    pub title: String,
    pub width: i32,
    pub height: i32,
    /// Integer UI scale applied to new windows
    pub scale: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Report dead keys as separate key events instead of composing them
    pub translate_dead_keys: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Font file used as the last-resort fallback
    pub fallback_font: Option<PathBuf>,
    /// Family name tried before generic sans-serif when looking up a default font
    pub fallback_family: Option<String>,
    /// Default font size in pixels
    pub font_size: f32,
    pub antialias: bool,
    /// Scale of sprite-sheet fonts loaded without an explicit one
    pub sprite_sheet_scale: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Native,
            title: "glint".to_string(),
            width: 640,
            height: 480,
            scale: 1,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            translate_dead_keys: false,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            fallback_font: None,
            fallback_family: None,
            font_size: 12.0,
            antialias: true,
            sprite_sheet_scale: 1,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl GlintConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `glint.toml` from the current directory, or defaults if it is
    /// missing or unreadable
    pub fn load_or_default() -> Self {
        Self::load_from_file("glint.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("GLINT_BACKEND") {
            if let Some(kind) = BackendKind::parse(&val) {
                self.window.backend = kind;
            }
        }
        if let Ok(val) = std::env::var("GLINT_WINDOW_SCALE") {
            if let Ok(scale) = val.parse::<i32>() {
                self.window.scale = scale.max(1);
            }
        }
        if let Ok(val) = std::env::var("GLINT_DEAD_KEYS") {
            self.events.translate_dead_keys = parse_flag(&val);
        }
        if let Ok(font) = std::env::var("GLINT_FALLBACK_FONT") {
            self.text.fallback_font = Some(PathBuf::from(font));
        }
        if let Ok(val) = std::env::var("GLINT_FONT_SIZE") {
            if let Ok(size) = val.parse::<f32>() {
                self.text.font_size = size;
            }
        }
        if let Ok(val) = std::env::var("GLINT_TEXT_ANTIALIAS") {
            self.text.antialias = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GlintConfig::default();
        assert_eq!(config.window.backend, BackendKind::Native);
        assert_eq!(config.window.scale, 1);
        assert!(config.text.antialias);
        assert!(!config.events.translate_dead_keys);
    }

    #[test]
    fn test_toml_serialization() {
        let config = GlintConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: GlintConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.window.width, 640);
        assert_eq!(parsed.text.font_size, 12.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");
        std::fs::write(
            &path,
            "[window]\nbackend = \"headless\"\n\n[text]\nfont_size = 18.0\n",
        )
        .unwrap();

        let config = GlintConfig::load_from_file(&path).unwrap();
        assert_eq!(config.window.backend, BackendKind::Headless);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.text.font_size, 18.0);
        assert!(config.text.antialias);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");
        std::fs::write(&path, "[window\n").unwrap();
        assert!(matches!(
            GlintConfig::load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if glint.toml doesn't exist
        let config = GlintConfig::load_or_default();
        assert!(config.window.width > 0);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("GLINT_BACKEND", "none");
            std::env::set_var("GLINT_WINDOW_SCALE", "2");
            std::env::set_var("GLINT_TEXT_ANTIALIAS", "false");
        }

        let mut config = GlintConfig::default();
        config.merge_with_env();

        assert_eq!(config.window.backend, BackendKind::Headless);
        assert_eq!(config.window.scale, 2);
        assert!(!config.text.antialias);

        unsafe {
            std::env::remove_var("GLINT_BACKEND");
            std::env::remove_var("GLINT_WINDOW_SCALE");
            std::env::remove_var("GLINT_TEXT_ANTIALIAS");
        }
    }
}
