//! Building features from regions data.

use rand::Rng;
use roikit_core::{Permissions, RegionState, RegionsEvent, ShapeId};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};

use super::RegionCollection;
use crate::conversion::{feature_factory, shape_kind_of, JsonObject, TextMetrics};
use crate::feature::{Feature, UNATTACHED};
use crate::model::{Coord, Extent, RegionShape};
use crate::regions::measure::calculate_length_and_area;
use crate::style::{remedy_shape_info_if_necessary, remedy_style_if_necessary};

static LAST_UID: AtomicI64 = AtomicI64::new(0);

/// Process-wide counter for temporary shape ids, starting at 1.
pub fn next_uid() -> i64 {
    LAST_UID.fetch_add(1, Ordering::Relaxed) + 1
}

fn plane_index(shape: &JsonObject, key: &str) -> i32 {
    shape
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(UNATTACHED)
}

fn shape_permissions(shape: &JsonObject) -> Option<Permissions> {
    let permissions = shape.get("omero:details")?.get("permissions")?;
    if !permissions.is_object() {
        return None;
    }
    serde_json::from_value(permissions.clone()).ok()
}

/// Converts ROI objects into features.
///
/// A roi needs a numeric `@id` and a `shapes` array, a shape a numeric
/// `@id` and its permissions. Anything else is skipped, with an error logged
/// for shapes that fail to convert. Features come out in state DEFAULT,
/// measured with the given pixel size.
pub fn create_features_from_regions_response(
    rois: &[Value],
    metrics: &TextMetrics,
    pixel_size: f64,
    pixel_symbol: &str,
) -> Vec<Feature> {
    let mut features = Vec::new();
    for roi in rois {
        let (Some(roi_id), Some(shapes)) = (
            roi.get("@id").and_then(Value::as_i64),
            roi.get("shapes").and_then(Value::as_array),
        ) else {
            continue;
        };

        for shape in shapes {
            let Some(mut shape) = shape.as_object().cloned() else {
                continue;
            };
            let Some(shape_id) = shape.get("@id").and_then(Value::as_i64) else {
                continue;
            };
            let id = ShapeId::new(roi_id, shape_id);
            let schema_type = shape
                .get("@type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let type_name = schema_type
                .rsplit_once('#')
                .map(|(_, name)| Value::from(name.to_lowercase()))
                .unwrap_or(Value::Null);
            shape.insert("type".to_string(), type_name);

            let Some(feature) = feature_factory(&mut shape, metrics) else {
                tracing::error!(shape_type = %schema_type, shape_id = %id, "Failed to create shape from json");
                continue;
            };
            let Some(permissions) = shape_permissions(&shape) else {
                tracing::error!(shape_id = %id, "Missing permissions for shape");
                continue;
            };

            let mut feature = Feature {
                id,
                ..feature
            }
            .with_planes(
                plane_index(&shape, "TheZ"),
                plane_index(&shape, "TheT"),
                plane_index(&shape, "TheC"),
            )
            .with_state(RegionState::Default)
            .with_permissions(permissions);
            calculate_length_and_area(&mut feature, true, pixel_size, pixel_symbol);
            features.push(feature);
        }
    }
    features
}

/// Random whole-numbered offset inside `[0, extent[2]] x [0, extent[3]]`,
/// returned with y negated.
pub fn random_coordinate_within_extent(extent: &Extent) -> Coord {
    let mut rng = rand::rng();
    let x = rng.random_range(0..=extent[2].max(0.0) as u64);
    let y = rng.random_range(0..=extent[3].max(0.0) as u64);
    [x as f64, -(y as f64)]
}

fn extent_width(extent: &Extent) -> f64 {
    extent[2] - extent[0]
}

fn extent_height(extent: &Extent) -> f64 {
    extent[3] - extent[1]
}

/// Creates `number` copies of a shape for pasting or generation.
///
/// The shape info is completed with default style and geometry. With a
/// `position`, copies are moved there; without one they stay in place on a
/// compatible image and land at random spots inside `extent` otherwise.
/// Copies are ADDED and get temporary ids `<roi_id or -1>:-<uid>`, unless
/// the info names a `shape_id`. Returns `None` for unusable input.
pub fn generate_regions(
    shape_info: &JsonObject,
    number: usize,
    extent: &Extent,
    position: Option<Coord>,
    is_compatible: bool,
    metrics: &TextMetrics,
) -> Option<Vec<Feature>> {
    if number == 0 || extent.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let kind = shape_kind_of(shape_info)?;
    let mut info = shape_info.clone();
    remedy_style_if_necessary(&mut info, kind);
    remedy_shape_info_if_necessary(&mut info, kind);

    let mut prototype = feature_factory(&mut info, metrics)?
        .with_state(RegionState::Added)
        .with_planes(
            plane_index(&info, "TheZ"),
            plane_index(&info, "TheT"),
            plane_index(&info, "TheC"),
        );

    let mut extent = *extent;
    if position.is_some() || !is_compatible {
        let bbox = prototype.geometry.extent();
        let width = match extent_width(&bbox) {
            w if w == 0.0 => 1.0,
            w => w,
        };
        let height = match extent_height(&bbox) {
            h if h == 0.0 => 1.0,
            h => h,
        };
        prototype.geometry.translate(-bbox[0], -bbox[3]);
        extent = [
            0.0,
            0.0,
            extent_width(&extent) - width,
            extent_height(&extent) - height,
        ];
    }

    let given_id = info
        .get("shape_id")
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<ShapeId>().ok());
    let roi_id = info.get("roi_id").and_then(Value::as_i64).unwrap_or(-1);

    let copies = (0..number)
        .map(|_| {
            let mut feature = prototype.clone();
            feature.id = given_id.unwrap_or_else(|| ShapeId::new(roi_id, -next_uid()));
            match position {
                Some([x, y]) => feature.geometry.translate(x, y),
                None if !is_compatible => {
                    let [x, y] = random_coordinate_within_extent(&extent);
                    feature.geometry.translate(x, y);
                }
                None => {}
            }
            feature
        })
        .collect();
    Some(copies)
}

impl RegionCollection {
    /// Replaces all features with the ones built from `rois`.
    ///
    /// The data is kept for later rebuilds; remembered unsaved shapes are
    /// forgotten. Returns the number of features loaded.
    pub fn load_regions(&mut self, rois: Vec<Value>) -> usize {
        self.clear();
        self.new_unsaved.clear();
        self.regions_info = Some(rois);
        self.rebuild(false)
    }

    /// Rebuilds the features from the kept regions data.
    ///
    /// Shapes added since the last store are carried over when they are
    /// unattached in z or t, or sit on the current plane.
    pub fn update_regions(&mut self) -> usize {
        self.remember_added();
        self.clear();
        self.rebuild(true)
    }

    fn remember_added(&mut self) {
        for feature in self.features.values() {
            if feature.state == RegionState::Added && !self.new_unsaved.contains_key(&feature.id) {
                self.new_unsaved.insert(feature.id, feature.clone());
            }
        }
    }

    fn rebuild(&mut self, include_new: bool) -> usize {
        let mut features = match &self.regions_info {
            Some(rois) => create_features_from_regions_response(
                rois,
                &self.options.text_metrics,
                self.options.pixel_size,
                &self.options.pixel_symbol,
            ),
            None => Vec::new(),
        };
        if include_new {
            let mut unsaved: Vec<&Feature> = self
                .new_unsaved
                .values()
                .filter(|f| {
                    f.the_t == UNATTACHED
                        || f.the_z == UNATTACHED
                        || (f.the_t == self.plane.t && f.the_z == self.plane.z)
                })
                .collect();
            unsaved.sort_by_key(|f| std::cmp::Reverse(f.id.shape_id));
            features.extend(unsaved.into_iter().cloned());
        }

        let feature_count = features.len();
        self.add_features(features);
        self.refresh_labels();
        tracing::info!(image_id = self.image_id, feature_count, "Regions loaded");
        self.notify(RegionsEvent::Loaded { feature_count });
        feature_count
    }
}
