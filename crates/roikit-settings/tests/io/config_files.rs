use roikit_settings::{Config, ConfigError, SettingsError};
use std::path::PathBuf;
use tempfile::TempDir;

fn customized() -> Config {
    let mut config = Config::new();
    config.regions.separate_roi_per_new_shape = true;
    config.regions.history_limit = 25;
    config.measurement.pixel_size = 0.065;
    config.measurement.pixel_symbol = "\u{00B5}m".to_string();
    config.labels.default_font_family = "DejaVu Sans".to_string();
    config.add_recent_file(PathBuf::from("/data/rois.json"));
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.toml");
    let config = customized();
    config.save_to_file(&path).expect("save");
    assert_eq!(Config::load_from_file(&path).expect("load"), config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.json");
    let config = customized();
    config.save_to_file(&path).expect("save");
    assert_eq!(Config::load_from_file(&path).expect("load"), config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[measurement]\npixel_size = 2.0\npixel_symbol = \"nm\"\n")
        .expect("write");
    let config = Config::load_from_file(&path).expect("load");
    assert_eq!(config.measurement.pixel_size, 2.0);
    assert_eq!(config.regions, Config::default().regions);
    assert_eq!(config.labels.char_width_ratio, 0.6);
}

#[test]
fn test_invalid_files_are_rejected() {
    let dir = TempDir::new().expect("temp dir");

    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"measurement": {"pixel_size": -1.0}}"#).expect("write");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
    ));

    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Json(_))
    ));

    let path = dir.path().join("missing.toml");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Read { .. })
    ));

    let path = dir.path().join("config.ini");
    assert!(matches!(
        Config::new().save_to_file(&path),
        Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
    ));
}
