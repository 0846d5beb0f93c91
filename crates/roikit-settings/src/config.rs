//! Configuration for the regions viewer
//!
//! Supports JSON and TOML files stored in platform-specific directories.
//!
//! Configuration is organized into sections:
//! - Regions behaviour (new rois, history, label text)
//! - Measurement (pixel size and its unit)
//! - Label defaults (font and text size estimate)

use roikit_core::{LengthUnit, PIXEL_SYMBOL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

const APP_DIR: &str = "roikit";
const CONFIG_FILE: &str = "config.toml";

/// Region collection behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsSettings {
    /// Store every new shape in a roi of its own
    pub separate_roi_per_new_shape: bool,
    /// Kept undo entries, 0 keeps all
    pub history_limit: usize,
    /// Label text grows with the zoom
    pub scale_text: bool,
    /// Label text turns with the view
    pub rotate_text: bool,
    pub show_comments: bool,
    pub enable_shape_popup: bool,
}

impl Default for RegionsSettings {
    fn default() -> Self {
        Self {
            separate_roi_per_new_shape: false,
            history_limit: 0,
            scale_text: true,
            rotate_text: false,
            show_comments: false,
            enable_shape_popup: true,
        }
    }
}

/// Physical pixel size used for lengths and areas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    pub pixel_size: f64,
    /// `px` or a length unit symbol such as `µm`
    pub pixel_symbol: String,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            pixel_size: 1.0,
            pixel_symbol: PIXEL_SYMBOL.to_string(),
        }
    }
}

/// Font of new labels and the text size estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub default_font_family: String,
    pub default_font_style: String,
    /// Font size in pixels
    pub default_font_size: f64,
    /// Average glyph width relative to the font size
    pub char_width_ratio: f64,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            default_font_family: "sans-serif".to_string(),
            default_font_style: "normal".to_string(),
            default_font_size: 10.0,
            char_width_ratio: 0.6,
        }
    }
}

impl LabelSettings {
    /// Css font shorthand, `"<style> <size>px <family>"`.
    pub fn font(&self) -> String {
        format!(
            "{} {}px {}",
            self.default_font_style, self.default_font_size, self.default_font_family
        )
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recently opened regions files, newest first
    pub recent_files: Vec<PathBuf>,
    /// Number of recent files to track
    pub recent_files_count: usize,
    pub regions: RegionsSettings,
    pub measurement: MeasurementSettings,
    pub labels: LabelSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
            recent_files_count: 10,
            regions: RegionsSettings::default(),
            measurement: MeasurementSettings::default(),
            labels: LabelSettings::default(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or_default().to_string()).into()),
    }
}

/// Platform config location, e.g. `~/.config/roikit/config.toml`.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or(SettingsError::NoConfigDirectory)
}

fn positive(key: &'static str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange { key, value }.into())
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(config)
    }

    /// Save config to a `.json` or `.toml` file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        positive("measurement.pixel_size", self.measurement.pixel_size)?;
        let symbol = self.measurement.pixel_symbol.as_str();
        if symbol != PIXEL_SYMBOL && LengthUnit::from_symbol(symbol).is_none() {
            return Err(ConfigError::UnknownUnit(symbol.to_string()).into());
        }

        positive("labels.default_font_size", self.labels.default_font_size)?;
        positive("labels.char_width_ratio", self.labels.char_width_ratio)?;
        if self.labels.default_font_family.trim().is_empty() {
            return Err(SettingsError::invalid(
                "labels.default_font_family",
                "must not be empty",
            ));
        }
        Ok(())
    }

    /// Add a file to the recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.recent_files_count);
    }

    /// Merge another config into this one.
    ///
    /// Sections of `other` that still hold their defaults leave ours alone.
    pub fn merge(&mut self, other: &Config) {
        if other.regions != RegionsSettings::default() {
            self.regions = other.regions.clone();
        }
        if other.measurement != MeasurementSettings::default() {
            self.measurement = other.measurement.clone();
        }
        if other.labels != LabelSettings::default() {
            self.labels = other.labels.clone();
        }
        for path in other.recent_files.iter().rev() {
            self.add_recent_file(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.labels.font(), "normal 10px sans-serif");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::new();
        config.measurement.pixel_size = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));

        let mut config = Config::new();
        config.measurement.pixel_symbol = "furlong".to_string();
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::UnknownUnit(_)))
        ));

        let mut config = Config::new();
        config.labels.default_font_family = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_recent_files_are_unique_and_bounded() {
        let mut config = Config::new();
        config.recent_files_count = 2;
        config.add_recent_file(PathBuf::from("a.json"));
        config.add_recent_file(PathBuf::from("b.json"));
        config.add_recent_file(PathBuf::from("a.json"));
        config.add_recent_file(PathBuf::from("c.json"));
        assert_eq!(
            config.recent_files,
            vec![PathBuf::from("c.json"), PathBuf::from("a.json")]
        );
    }

    #[test]
    fn test_merge_takes_changed_sections() {
        let mut base = Config::new();
        base.labels.char_width_ratio = 0.5;

        let mut other = Config::new();
        other.measurement.pixel_symbol = "µm".to_string();
        other.measurement.pixel_size = 0.25;
        other.recent_files = vec![PathBuf::from("new.json")];

        base.merge(&other);
        assert_eq!(base.measurement.pixel_size, 0.25);
        assert_eq!(base.labels.char_width_ratio, 0.5);
        assert_eq!(base.recent_files, vec![PathBuf::from("new.json")]);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            format_of(Path::new("settings.yaml")),
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(ext))) if ext == "yaml"
        ));
    }
}
