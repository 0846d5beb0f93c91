//! RoiKit Settings Crate
//!
//! Handles the viewer's regions configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, LabelSettings, MeasurementSettings, RegionsSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
