//! Length and area of shapes in physical units.

use roikit_core::{round_three_decimals, scaled_pixel_size, ShapeId};

use super::RegionCollection;
use crate::feature::Feature;
use crate::model::{Geometry, RegionShape, ShapeKind};

/// Measurement of one shape, `-1` where a value does not apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub id: ShapeId,
    pub area: f64,
    pub length: f64,
}

fn has_area(kind: ShapeKind) -> bool {
    !matches!(
        kind,
        ShapeKind::Point | ShapeKind::Line | ShapeKind::Polyline | ShapeKind::Label
    )
}

fn has_length(kind: ShapeKind) -> bool {
    kind.is_line_like()
}

/// Measures a bare geometry: `(length, area)`, `None` where not applicable.
pub fn measure_geometry(
    geometry: &Geometry,
    pixel_size: f64,
    pixel_symbol: &str,
) -> (Option<f64>, Option<f64>) {
    let kind = geometry.kind();
    let size = scaled_pixel_size(pixel_size, pixel_symbol);
    let length = has_length(kind).then(|| round_three_decimals(geometry.length() * size));
    let area = has_area(kind).then(|| round_three_decimals(geometry.area() * size * size));
    (length, area)
}

/// Fills in the cached length and area of a feature and returns them.
///
/// Values already present are kept unless `recalculate` is set.
pub fn calculate_length_and_area(
    feature: &mut Feature,
    recalculate: bool,
    pixel_size: f64,
    pixel_symbol: &str,
) -> Measurement {
    let (length, area) = measure_geometry(&feature.geometry, pixel_size, pixel_symbol);
    if recalculate || feature.area.is_none() {
        feature.area = Some(area.unwrap_or(-1.0));
    }
    if recalculate || feature.length.is_none() {
        feature.length = Some(length.unwrap_or(-1.0));
    }
    Measurement {
        id: feature.id,
        area: feature.area.unwrap_or(-1.0),
        length: feature.length.unwrap_or(-1.0),
    }
}

impl RegionCollection {
    pub(crate) fn measure(&self, feature: &mut Feature, recalculate: bool) -> Measurement {
        calculate_length_and_area(
            feature,
            recalculate,
            self.options.pixel_size,
            &self.options.pixel_symbol,
        )
    }

    /// Length and area of one shape, `None` for unknown ids.
    pub fn length_and_area_for_shape(
        &mut self,
        id: &ShapeId,
        recalculate: bool,
    ) -> Option<Measurement> {
        let mut feature = self.features.get(id)?.clone();
        let measurement = self.measure(&mut feature, recalculate);
        self.features.insert(*id, feature);
        Some(measurement)
    }

    /// Measures a batch of shapes, skipping unknown ids.
    pub fn measure_shapes(&mut self, ids: &[ShapeId], recalculate: bool) -> Vec<Measurement> {
        ids.iter()
            .filter_map(|id| self.length_and_area_for_shape(id, recalculate))
            .collect()
    }
}
