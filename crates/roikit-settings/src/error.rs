//! Error types for the settings crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read settings from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Cannot write settings to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The platform reports no per-user configuration directory.
    #[error("No configuration directory on this platform")]
    NoConfigDirectory,

    /// A value passes its type but not its meaning (empty font family, ...)
    #[error("Setting '{key}' {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Malformed JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML settings: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Settings not representable as TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validation failures of individual values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("Settings files must end in .json or .toml, not '{0}'")]
    UnsupportedFormat(String),

    #[error("'{key}' must be a positive number, got {value}")]
    ValueOutOfRange { key: &'static str, value: f64 },

    #[error("'{0}' is not a known length unit")]
    UnknownUnit(String),
}

impl SettingsError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = SettingsError::invalid("labels.default_font_family", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Setting 'labels.default_font_family' must not be empty"
        );

        let err = ConfigError::ValueOutOfRange {
            key: "measurement.pixel_size",
            value: -0.5,
        };
        assert_eq!(
            err.to_string(),
            "'measurement.pixel_size' must be a positive number, got -0.5"
        );
    }

    #[test]
    fn test_read_errors_carry_the_path() {
        let err = SettingsError::Read {
            path: PathBuf::from("/tmp/roikit.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Cannot read settings from /tmp/roikit.toml: gone");
    }

    #[test]
    fn test_config_errors_pass_through() {
        let err: SettingsError = ConfigError::UnknownUnit("furlong".to_string()).into();
        assert!(matches!(err, SettingsError::Config(ConfigError::UnknownUnit(_))));
        assert_eq!(err.to_string(), "'furlong' is not a known length unit");
    }
}
