//! Drawing and edit gestures.
//!
//! A gesture brackets an interactive edit: it opens a history entry with the
//! geometries before the edit and closes it with the geometries after. A
//! cancelled gesture puts the old geometries back and leaves no entry behind.

use roikit_core::{ChangedProperty, HistoryEvent, PropertyEvent, RegionState, RegionsEvent, ShapeId};

use super::loader::next_uid;
use super::{PropertyChange, RegionCollection};
use crate::feature::Feature;
use crate::model::{Coord, Geometry, RegionShape};
use crate::style::ShapeStyle;

impl RegionCollection {
    fn is_editable(&self, id: &ShapeId) -> bool {
        self.features
            .get(id)
            .is_some_and(|f| f.permissions.can_edit && !f.is_deleted())
    }

    pub fn active_gesture(&self) -> Option<u64> {
        self.active_gesture
    }

    /// Starts an edit of the given features and returns its history id.
    ///
    /// Features that are unknown, deleted or not editable are left out; with
    /// none left no gesture starts. A gesture still open is cancelled first.
    pub fn begin_gesture(&mut self, ids: &[ShapeId]) -> Option<u64> {
        if self.active_gesture.is_some() {
            self.cancel_gesture();
        }
        let editable: Vec<ShapeId> = ids
            .iter()
            .filter(|id| self.is_editable(id))
            .copied()
            .collect();
        let hist_id = self.add_history(&editable, true, None)?;
        self.active_gesture = Some(hist_id);
        tracing::debug!(hist_id, shapes = editable.len(), "Gesture started");
        Some(hist_id)
    }

    /// Finishes the open gesture.
    ///
    /// The history entry is closed with the current geometries, the features
    /// are flagged modified and re-measured. Returns the closed entry id.
    pub fn end_gesture(&mut self) -> Option<u64> {
        let hist_id = self.active_gesture.take()?;
        let ids: Vec<ShapeId> = self
            .history_entry(hist_id)
            .map(|entry| entry.records.keys().copied().collect())
            .unwrap_or_default();

        let rotation = self.label_rotation();
        for id in &ids {
            if let Some(label) = self.features.get_mut(id).and_then(|f| f.geometry.as_label_mut()) {
                label.modify_original_coordinates(rotation, 1.0);
            }
        }

        let present: Vec<ShapeId> = ids.iter().filter(|id| self.contains(id)).copied().collect();
        if present.is_empty() {
            self.discard_history(hist_id);
            return None;
        }
        self.add_history(&present, false, Some(hist_id))?;
        self.set_property(&present, PropertyChange::State(RegionState::Modified));
        self.measure_shapes(&present, true);
        self.notify(HistoryEvent::EntryCreated {
            hist_id,
            shape_ids: present,
        });
        Some(hist_id)
    }

    /// Aborts the open gesture, restoring the geometries it started from.
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(hist_id) = self.active_gesture.take() else {
            return false;
        };
        let Some(entry) = self.discard_history(hist_id) else {
            return false;
        };
        for (id, record) in entry.records {
            if let (Some(feature), Some(old)) = (self.features.get_mut(&id), record.old_value) {
                feature.geometry = old;
            }
        }
        tracing::debug!(hist_id, "Gesture cancelled");
        self.notify(RegionsEvent::Changed);
        true
    }

    /// Runs `edit` on every editable feature of `ids`.
    ///
    /// Outside a gesture the edit gets a gesture (and history entry) of its own.
    fn edit_features<F>(&mut self, ids: &[ShapeId], mut edit: F) -> Vec<ShapeId>
    where
        F: FnMut(&mut Geometry) -> bool,
    {
        let own_gesture = self.active_gesture.is_none();
        if own_gesture && self.begin_gesture(ids).is_none() {
            return Vec::new();
        }
        let mut edited = Vec::new();
        for id in ids {
            if !self.is_editable(id) {
                continue;
            }
            if let Some(feature) = self.features.get_mut(id) {
                if edit(&mut feature.geometry) {
                    edited.push(*id);
                }
            }
        }
        if own_gesture {
            if edited.is_empty() {
                self.cancel_gesture();
            } else {
                self.end_gesture();
            }
        }
        edited
    }

    /// Moves features by `(dx, dy)` in model space.
    pub fn translate_features(&mut self, ids: &[ShapeId], dx: f64, dy: f64) -> Vec<ShapeId> {
        if !dx.is_finite() || !dy.is_finite() {
            return Vec::new();
        }
        self.edit_features(ids, |geometry| {
            geometry.translate(dx, dy);
            true
        })
    }

    /// Drags a vertex of a rectangle or an ellipse to `position`.
    ///
    /// Rectangles keep the opposite corner fixed; ellipses take the distance
    /// to the center as the new radius. Other shapes are not changed.
    pub fn modify_vertex(&mut self, id: &ShapeId, vertex_index: usize, position: Coord) -> bool {
        let edited = self.edit_features(std::slice::from_ref(id), |geometry| match geometry {
            Geometry::Rectangle(rect) => {
                rect.modify_by_vertex_drag(vertex_index, position);
                true
            }
            Geometry::Ellipse(ellipse) => {
                ellipse.modify_by_vertex_drag(position);
                true
            }
            _ => false,
        });
        !edited.is_empty()
    }

    /// Adds a freshly drawn shape in state ADDED and returns its temporary id.
    pub fn add_new_feature(
        &mut self,
        geometry: Geometry,
        style: ShapeStyle,
        planes: (i32, i32, i32),
    ) -> ShapeId {
        let id = ShapeId::new(-1, -next_uid());
        let (the_z, the_t, the_c) = planes;
        let feature = Feature::new(id, geometry)
            .with_state(RegionState::Added)
            .with_planes(the_z, the_t, the_c)
            .with_style(style);
        tracing::debug!(%id, kind = %feature.kind(), "New shape drawn");
        self.add_feature(feature);
        self.notify(PropertyEvent::Changed {
            shapes: vec![id],
            properties: vec![ChangedProperty::Modified],
            values: vec![true],
        });
        id
    }

    /// Rotation applied to label boxes so text stays upright unless it turns with the view.
    pub(crate) fn label_rotation(&self) -> f64 {
        if self.options.rotate_text {
            0.0
        } else {
            -self.view_rotation
        }
    }
}
