//! Plane filtering, spatial queries and label display.

use roikit_core::{PlanePosition, RegionsEvent, ShapeId};

use super::RegionCollection;
use crate::feature::{Feature, ViewState, UNATTACHED};
use crate::model::{Extent, RegionShape};
use crate::style::{measure_text_dimensions, FontSpec, DEFAULT_FONT_SIZE};

/// Whether a feature is drawn on the given plane.
///
/// Deleted and hidden features never are. Otherwise every attached plane
/// index has to match: the channel must be active, the timepoint current and
/// z inside the plane's z bounds (the current z, or the projected range).
pub fn feature_renders(feature: &Feature, view: &ViewState, plane: &PlanePosition) -> bool {
    if !view.visible || feature.is_deleted() {
        return false;
    }
    let channel_ok = feature.the_c == UNATTACHED || plane.is_channel_active(feature.the_c);
    let time_ok = feature.the_t == UNATTACHED || feature.the_t == plane.t;
    let z_ok = feature.the_z == UNATTACHED || plane.z_bounds().contains(feature.the_z);
    channel_ok && time_ok && z_ok
}

/// Font a label is drawn with at `zoom_factor`, never below the default size.
pub(crate) fn display_font(font: &FontSpec, zoom_factor: f64) -> FontSpec {
    let size = (font.size.trunc() * zoom_factor).max(DEFAULT_FONT_SIZE);
    FontSpec {
        size,
        ..font.clone()
    }
}

impl RegionCollection {
    pub fn render_feature(&self, id: &ShapeId) -> bool {
        self.features
            .get(id)
            .is_some_and(|feature| feature_renders(feature, &self.view_state(id), &self.plane))
    }

    /// Calls `callback` for every rendered feature touching `extent`.
    pub fn for_each_feature_in_extent<F>(&self, extent: &Extent, mut callback: F)
    where
        F: FnMut(&Feature),
    {
        for feature in self.features() {
            if feature.geometry.intersects_extent(extent) && self.render_feature(&feature.id) {
                callback(feature);
            }
        }
    }

    pub fn features_in_extent(&self, extent: &Extent) -> Vec<&Feature> {
        let mut found = Vec::new();
        self.for_each_feature_in_extent(extent, |f| found.push(f.id));
        found.iter().filter_map(|id| self.features.get(id)).collect()
    }

    /// Rendered features on the current plane, in insertion order.
    pub fn rendered_features(&self) -> Vec<&Feature> {
        self.features()
            .filter(|f| self.render_feature(&f.id))
            .collect()
    }

    /// View rotation in radians. Labels are turned back unless text rotates with the view.
    pub fn set_view_rotation(&mut self, rotation: f64) {
        self.view_rotation = rotation;
        self.refresh_labels();
        self.notify(RegionsEvent::Changed);
    }

    /// Zoom relative to the image resolution. Label boxes follow when text scales.
    pub fn set_zoom_factor(&mut self, zoom_factor: f64) {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 {
            return;
        }
        self.zoom_factor = zoom_factor;
        self.refresh_labels();
        self.notify(RegionsEvent::Changed);
    }

    /// Re-measures label boxes for the current zoom and rotation.
    pub(crate) fn refresh_labels(&mut self) {
        let rotation = self.label_rotation();
        let zoom = if self.options.scale_text {
            self.zoom_factor
        } else {
            1.0
        };
        let metrics = self.options.text_metrics;
        for feature in self.features.values_mut() {
            let font = display_font(&feature.style.text.font, zoom);
            let dimensions = measure_text_dimensions(
                &feature.style.text.text,
                &font,
                metrics.resolution,
                metrics.char_width_ratio,
            );
            if let Some(label) = feature.geometry.as_label_mut() {
                label.adjust_coordinates(rotation, Some(dimensions));
            }
        }
    }
}
