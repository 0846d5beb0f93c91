//! Region collection for one image.
//! Owns the shape features, their lifecycle state and view flags, the
//! undo/redo history and the bookkeeping around persistence.
//!
//! This module is split into submodules:
//! - `property`: Selection, visibility and state changes
//! - `render`: Plane filtering, spatial queries and label display
//! - `history`: Undo/redo entries
//! - `interaction`: Drawing and edit gestures
//! - `loader`: Building features from regions data
//! - `measure`: Length and area
//! - `store`: Store batches, reconciliation and the async session

mod history;
mod interaction;
mod loader;
mod measure;
mod property;
mod render;
mod store;

pub use history::{EntryStatus, HistoryEntry, HistoryRecord};
pub use loader::{
    create_features_from_regions_response, generate_regions, next_uid,
    random_coordinate_within_extent,
};
pub use measure::{calculate_length_and_area, measure_geometry, Measurement};
pub use property::PropertyChange;
pub use render::feature_renders;
pub use store::{RegionsSession, StoreOutcome};

use roikit_core::{AppEvent, EventBus, PlanePosition, RegionsEvent, ShapeId, PIXEL_SYMBOL};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::conversion::TextMetrics;
use crate::feature::{Feature, ViewState};
use history::History;

/// Collection behaviour that the host configures
#[derive(Clone, Debug, PartialEq)]
pub struct RegionsOptions {
    /// Every new shape is stored in a roi of its own
    pub separate_roi_per_new_shape: bool,
    /// Maximum number of kept history entries, 0 keeps all
    pub history_limit: usize,
    pub text_metrics: TextMetrics,
    /// Physical size of a pixel in `pixel_symbol` units
    pub pixel_size: f64,
    pub pixel_symbol: String,
    /// Label text grows with the zoom
    pub scale_text: bool,
    /// Label text turns with the view
    pub rotate_text: bool,
}

impl Default for RegionsOptions {
    fn default() -> Self {
        Self {
            separate_roi_per_new_shape: false,
            history_limit: 0,
            text_metrics: TextMetrics::default(),
            pixel_size: 1.0,
            pixel_symbol: PIXEL_SYMBOL.to_string(),
            scale_text: true,
            rotate_text: false,
        }
    }
}

/// Shape features of one image
#[derive(Debug)]
pub struct RegionCollection {
    image_id: i64,
    features: HashMap<ShapeId, Feature>,
    /// Insertion order of `features`
    order: Vec<ShapeId>,
    view: HashMap<ShapeId, ViewState>,
    /// Added features kept across rebuilds until they are stored
    new_unsaved: HashMap<ShapeId, Feature>,
    /// Last regions data received from the server
    regions_info: Option<Vec<Value>>,
    history: History,
    plane: PlanePosition,
    hover_id: Option<ShapeId>,
    /// Open edit gesture, see `begin_gesture`
    active_gesture: Option<u64>,
    view_rotation: f64,
    zoom_factor: f64,
    options: RegionsOptions,
    events: Arc<EventBus>,
}

impl RegionCollection {
    /// Creates an empty collection with its own event bus.
    pub fn new(image_id: i64, plane: PlanePosition, options: RegionsOptions) -> Self {
        Self::with_event_bus(image_id, plane, options, Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(
        image_id: i64,
        plane: PlanePosition,
        options: RegionsOptions,
        events: Arc<EventBus>,
    ) -> Self {
        let history = History::new(options.history_limit);
        Self {
            image_id,
            features: HashMap::new(),
            order: Vec::new(),
            view: HashMap::new(),
            new_unsaved: HashMap::new(),
            regions_info: None,
            history,
            plane,
            hover_id: None,
            active_gesture: None,
            view_rotation: 0.0,
            zoom_factor: 1.0,
            options,
            events,
        }
    }

    pub fn image_id(&self) -> i64 {
        self.image_id
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn options(&self) -> &RegionsOptions {
        &self.options
    }

    pub fn plane(&self) -> &PlanePosition {
        &self.plane
    }

    /// Moves to another plane; shapes are filtered against it when rendering.
    pub fn set_plane(&mut self, plane: PlanePosition) {
        self.plane = plane;
        self.notify(RegionsEvent::Changed);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.features.contains_key(id)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Feature> {
        self.features.get(id)
    }

    #[cfg(test)]
    pub(crate) fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Feature> {
        self.features.get_mut(id)
    }

    /// Features in insertion order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    pub fn feature_ids(&self) -> &[ShapeId] {
        &self.order
    }

    pub fn view_state(&self, id: &ShapeId) -> ViewState {
        self.view.get(id).copied().unwrap_or_default()
    }

    /// Ids of selected features, in insertion order.
    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.order
            .iter()
            .filter(|id| self.view_state(id).selected)
            .copied()
            .collect()
    }

    /// Adds a feature, replacing one with the same id.
    ///
    /// Unmeasured features get their length and area computed.
    pub fn add_feature(&mut self, mut feature: Feature) {
        if feature.area.is_none() || feature.length.is_none() {
            self.measure(&mut feature, false);
        }
        let id = feature.id;
        if self.features.insert(id, feature).is_none() {
            self.order.push(id);
        }
        self.view.entry(id).or_default();
    }

    pub fn add_features(&mut self, features: impl IntoIterator<Item = Feature>) {
        for feature in features {
            self.add_feature(feature);
        }
    }

    pub fn remove_feature(&mut self, id: &ShapeId) -> Option<Feature> {
        let removed = self.features.remove(id)?;
        self.order.retain(|other| other != id);
        self.view.remove(id);
        self.new_unsaved.remove(id);
        if self.hover_id.as_ref() == Some(id) {
            self.hover_id = None;
        }
        Some(removed)
    }

    /// Gives a feature a new id, keeping its position and view flags.
    pub(crate) fn rekey_feature(&mut self, old: &ShapeId, new: ShapeId) -> bool {
        let Some(mut feature) = self.features.remove(old) else {
            return false;
        };
        feature.id = new;
        self.features.insert(new, feature);
        if let Some(slot) = self.order.iter_mut().find(|id| **id == *old) {
            *slot = new;
        }
        if let Some(view) = self.view.remove(old) {
            self.view.insert(new, view);
        }
        self.new_unsaved.remove(old);
        true
    }

    /// Removes all features and view flags. History is kept.
    pub fn clear(&mut self) {
        self.features.clear();
        self.order.clear();
        self.view.clear();
        self.hover_id = None;
    }

    pub fn hover_id(&self) -> Option<ShapeId> {
        self.hover_id
    }

    pub fn set_hover_id(&mut self, id: Option<ShapeId>) {
        self.hover_id = id;
        self.notify(RegionsEvent::Changed);
    }

    pub fn scale_text(&self) -> bool {
        self.options.scale_text
    }

    pub fn set_scale_text(&mut self, scale_text: bool) {
        self.options.scale_text = scale_text;
        self.refresh_labels();
        self.notify(RegionsEvent::Changed);
    }

    pub fn rotate_text(&self) -> bool {
        self.options.rotate_text
    }

    pub fn set_rotate_text(&mut self, rotate_text: bool) {
        self.options.rotate_text = rotate_text;
        self.refresh_labels();
        self.notify(RegionsEvent::Changed);
    }

    /// Drops features, history and cached regions data.
    pub fn dispose(&mut self) {
        self.clear();
        self.new_unsaved.clear();
        self.history.clear();
        self.active_gesture = None;
        self.regions_info = None;
        tracing::debug!(image_id = self.image_id, "Disposed region collection");
    }

    pub(crate) fn notify(&self, event: impl Into<AppEvent>) {
        let event = event.into();
        if let Err(err) = self.events.publish(event) {
            tracing::trace!(error = %err, "Regions event not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, Point};
    use roikit_core::{EventFilter, RegionState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn point_feature(roi: i64, shape: i64) -> Feature {
        let point = Point::new(1.0, -1.0, None).expect("valid");
        Feature::new(ShapeId::new(roi, shape), Geometry::Point(point))
    }

    #[test]
    fn test_add_and_remove_keep_order() {
        let mut regions = RegionCollection::new(1, PlanePosition::default(), RegionsOptions::default());
        regions.add_features([point_feature(1, 1), point_feature(1, 2), point_feature(2, 3)]);
        assert_eq!(regions.len(), 3);
        regions.remove_feature(&ShapeId::new(1, 2));
        let ids: Vec<_> = regions.features().map(|f| f.id).collect();
        assert_eq!(ids, vec![ShapeId::new(1, 1), ShapeId::new(2, 3)]);
        assert!(regions.view_state(&ShapeId::new(1, 1)).visible);
    }

    #[test]
    fn test_add_measures_features() {
        let mut regions = RegionCollection::new(1, PlanePosition::default(), RegionsOptions::default());
        regions.add_feature(point_feature(1, 1));
        let feature = regions.get(&ShapeId::new(1, 1)).expect("feature");
        assert_eq!((feature.area, feature.length), (Some(-1.0), Some(-1.0)));
    }

    #[test]
    fn test_rekey_moves_view_state() {
        let mut regions = RegionCollection::new(1, PlanePosition::default(), RegionsOptions::default());
        regions.add_feature(point_feature(-1, -4).with_state(RegionState::Added));
        regions.set_property(&[ShapeId::new(-1, -4)], PropertyChange::Selected(true));
        assert!(regions.rekey_feature(&ShapeId::new(-1, -4), ShapeId::new(3, 9)));
        assert!(regions.view_state(&ShapeId::new(3, 9)).selected);
        assert_eq!(regions.feature_ids(), &[ShapeId::new(3, 9)]);
    }

    #[test]
    fn test_flags_notify() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        bus.subscribe(EventFilter::All, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut regions =
            RegionCollection::with_event_bus(1, PlanePosition::default(), RegionsOptions::default(), bus);
        regions.set_hover_id(Some(ShapeId::new(1, 1)));
        regions.set_scale_text(false);
        regions.set_rotate_text(true);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert!(!regions.scale_text() && regions.rotate_text());

        regions.dispose();
        assert!(regions.is_empty());
    }
}
