//! Loads a regions file and reports what it contains.
//!
//! ```text
//! roikit <rois.json> [--config <file>] [--image <id>] [--z <index>] [--t <index>] [--channels <c,c,...>]
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use roikit::{init_logging, regions_options, summarize, Config, PlanePosition, RegionCollection};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "roikit", version, about = "Summarize the regions of interest of an image")]
struct Args {
    /// Rois file: an array of rois or an object with a `data` array
    rois: PathBuf,
    /// Settings file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long = "image", default_value_t = -1, allow_negative_numbers = true)]
    image_id: i64,
    #[arg(long, default_value_t = 0)]
    z: i32,
    #[arg(long, default_value_t = 0)]
    t: i32,
    /// Active channel indices
    #[arg(long, value_delimiter = ',', default_value = "0")]
    channels: Vec<i32>,
}

impl Args {
    fn plane(&self) -> PlanePosition {
        PlanePosition::new(self.z, self.t, self.channels.clone())
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match roikit_settings::default_config_path() {
        Ok(path) if path.exists() => Config::load_from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        _ => Ok(Config::default()),
    }
}

/// Accepts a bare array of rois or an object carrying them under `data`.
fn read_rois(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match value {
        Value::Array(rois) => Ok(rois),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rois)) => Ok(rois),
            _ => bail!("{} has no roi array under \"data\"", path.display()),
        },
        _ => bail!("{} does not hold rois", path.display()),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!(version = roikit::VERSION, build_date = roikit::BUILD_DATE, "RoiKit");

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let rois = read_rois(&args.rois)?;

    let mut regions = RegionCollection::new(args.image_id, args.plane(), regions_options(&config));
    let loaded = regions.load_regions(rois);
    tracing::info!(path = %args.rois.display(), loaded, "Regions loaded");

    let summary = summarize(&regions);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
    );
    Ok(())
}
