//! # RoiKit
//!
//! Region-of-interest shapes for multi-dimensional microscopy image viewers:
//! - Affine transform math in the server's 6-element matrix layout
//! - Point, line/polyline, polygon, rectangle, ellipse, label and mask geometries
//! - Shape JSON conversion in both directions
//! - A region collection tracking lifecycle state, plane attachment,
//!   undo/redo history and store reconciliation
//!
//! ## Architecture
//!
//! RoiKit is organized as a workspace with multiple crates:
//!
//! 1. **roikit-core** - Shape ids, states, dimensions, units, errors, events and the backend trait
//! 2. **roikit-regions** - Geometry, conversion and the region collection
//! 3. **roikit-settings** - Configuration stored as JSON or TOML
//! 4. **roikit** - Main binary that integrates all crates

pub use roikit_core::{
    AppEvent, Error, EventBus, ImageExtent, LengthUnit, Permissions, PersistenceError,
    PlanePosition, RegionState, RegionsBackend, Result, ShapeId, PIXEL_SYMBOL,
};

pub use roikit_regions::{
    Feature, Geometry, RegionCollection, RegionShape, RegionsOptions, RegionsSession, ShapeKind,
    TextMetrics,
};

pub use roikit_settings::{Config, SettingsError};

use serde::Serialize;
use std::collections::BTreeMap;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Region collection options taken from the configuration.
pub fn regions_options(config: &Config) -> RegionsOptions {
    RegionsOptions {
        separate_roi_per_new_shape: config.regions.separate_roi_per_new_shape,
        history_limit: config.regions.history_limit,
        text_metrics: TextMetrics {
            char_width_ratio: config.labels.char_width_ratio,
            ..TextMetrics::default()
        },
        pixel_size: config.measurement.pixel_size,
        pixel_symbol: config.measurement.pixel_symbol.clone(),
        scale_text: config.regions.scale_text,
        rotate_text: config.regions.rotate_text,
    }
}

/// Overview of a loaded collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionsSummary {
    pub image_id: i64,
    pub shapes: usize,
    /// Shapes drawn on the current plane
    pub rendered: usize,
    pub by_kind: BTreeMap<String, usize>,
    /// Sum of the measured areas, in squared `unit`
    pub total_area: f64,
    /// Sum of the measured line lengths, in `unit`
    pub total_length: f64,
    pub unit: String,
}

/// Counts and measurement totals of a collection.
pub fn summarize(regions: &RegionCollection) -> RegionsSummary {
    let mut by_kind: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_area = 0.0;
    let mut total_length = 0.0;
    for feature in regions.features() {
        *by_kind.entry(feature.kind().to_string()).or_default() += 1;
        total_area += feature.area.filter(|a| *a > 0.0).unwrap_or(0.0);
        total_length += feature.length.filter(|l| *l > 0.0).unwrap_or(0.0);
    }
    let symbol = &regions.options().pixel_symbol;
    let unit = LengthUnit::from_symbol(symbol)
        .map(|unit| unit.symbol())
        .unwrap_or(PIXEL_SYMBOL)
        .to_string();
    RegionsSummary {
        image_id: regions.image_id(),
        shapes: regions.len(),
        rendered: regions.rendered_features().len(),
        by_kind,
        total_area,
        total_length,
        unit,
    }
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roikit_regions::{Line, Rectangle};

    #[test]
    fn test_options_follow_config() {
        let mut config = Config::default();
        config.regions.history_limit = 7;
        config.measurement.pixel_symbol = "nm".to_string();
        config.labels.char_width_ratio = 0.5;

        let options = regions_options(&config);
        assert_eq!(options.history_limit, 7);
        assert_eq!(options.pixel_symbol, "nm");
        assert_eq!(options.text_metrics.char_width_ratio, 0.5);
        assert_eq!(options.text_metrics.resolution, 1.0);
    }

    #[test]
    fn test_summary_totals() {
        let mut regions =
            RegionCollection::new(9, PlanePosition::new(0, 0, vec![0]), RegionsOptions::default());
        let rect = Rectangle::new(0.0, 0.0, 4.0, 5.0, None).expect("valid");
        regions.add_feature(Feature::new(ShapeId::new(1, 1), Geometry::Rectangle(rect)));
        let line = Line::new(vec![[0.0, 0.0], [3.0, -4.0]], false, false, None).expect("valid");
        regions.add_feature(Feature::new(ShapeId::new(1, 2), Geometry::Line(line)));

        let summary = summarize(&regions);
        assert_eq!(summary.shapes, 2);
        assert_eq!(summary.rendered, 2);
        assert_eq!(summary.total_area, 20.0);
        assert_eq!(summary.total_length, 5.0);
        assert_eq!(summary.by_kind.get("rectangle"), Some(&1));
        assert_eq!(summary.unit, "px");
    }
}
