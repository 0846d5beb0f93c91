//! Selection, visibility and lifecycle changes.

use roikit_core::{ChangedProperty, PropertyEvent, RegionState, ShapeId};

use super::RegionCollection;

/// A change requested through [`RegionCollection::set_property`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyChange {
    Selected(bool),
    Visible(bool),
    State(RegionState),
}

/// Outcome of one state change on one feature.
enum Applied {
    Skipped,
    /// Changed, reported with the given property and value
    Changed(ChangedProperty, bool),
    /// Dropped from the collection
    Dropped,
}

impl RegionCollection {
    /// Applies one change to a batch of features.
    ///
    /// Features that are unknown or lack the permission the change needs are
    /// left out silently. One notification lists the features that changed,
    /// which are also returned.
    pub fn set_property(&mut self, ids: &[ShapeId], change: PropertyChange) -> Vec<ShapeId> {
        let mut shapes = Vec::new();
        let mut properties = Vec::new();
        let mut values = Vec::new();

        for id in ids {
            if !self.features.contains_key(id) {
                continue;
            }
            let applied = match change {
                PropertyChange::Selected(selected) => {
                    self.view.entry(*id).or_default().selected = selected;
                    Applied::Changed(ChangedProperty::Selected, selected)
                }
                PropertyChange::Visible(visible) => {
                    let view = self.view.entry(*id).or_default();
                    view.visible = visible;
                    if !visible {
                        view.selected = false;
                    }
                    Applied::Changed(ChangedProperty::Visible, visible)
                }
                PropertyChange::State(state) => self.change_state(id, state),
            };
            match applied {
                Applied::Skipped => {}
                Applied::Changed(property, value) => {
                    shapes.push(*id);
                    properties.push(property);
                    values.push(value);
                }
                Applied::Dropped => {
                    self.remove_feature(id);
                    shapes.push(*id);
                    properties.push(ChangedProperty::Deleted);
                    values.push(true);
                }
            }
        }

        tracing::debug!(?change, requested = ids.len(), changed = shapes.len(), "Set property");
        self.notify(PropertyEvent::Changed {
            shapes: shapes.clone(),
            properties,
            values,
        });
        shapes
    }

    fn change_state(&mut self, id: &ShapeId, state: RegionState) -> Applied {
        let Some(feature) = self.features.get_mut(id) else {
            return Applied::Skipped;
        };
        let present = feature.state;
        match state {
            RegionState::Removed => {
                if !feature.permissions.can_delete {
                    return Applied::Skipped;
                }
                if present == RegionState::Added || feature.old_state == Some(RegionState::Added) {
                    return Applied::Dropped;
                }
                if present != RegionState::Removed {
                    feature.old_state = Some(present);
                }
                feature.state = RegionState::Removed;
                self.view.entry(*id).or_default().selected = false;
                Applied::Changed(ChangedProperty::Deleted, true)
            }
            RegionState::Modified => {
                if !feature.permissions.can_edit {
                    return Applied::Skipped;
                }
                match present {
                    // remembered for a rollback, the feature stays deleted
                    RegionState::Removed => {
                        feature.old_state = Some(RegionState::Modified);
                        return Applied::Skipped;
                    }
                    RegionState::Added => feature.old_state = Some(RegionState::Added),
                    _ => {}
                }
                feature.state = RegionState::Modified;
                Applied::Changed(ChangedProperty::Modified, true)
            }
            RegionState::Rollback => {
                if !feature.permissions.can_delete {
                    return Applied::Skipped;
                }
                // TODO: confirm whether a rollback without a recorded state should fall back to DEFAULT
                feature.state = feature.old_state.unwrap_or(RegionState::Default);
                Applied::Changed(ChangedProperty::Deleted, false)
            }
            RegionState::Default | RegionState::Added => {
                feature.state = state;
                Applied::Changed(ChangedProperty::Modified, state == RegionState::Added)
            }
        }
    }

    /// Marks features deleted.
    pub fn delete_features(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        self.set_property(ids, PropertyChange::State(RegionState::Removed))
    }

    /// Restores the state features had before their deletion.
    pub fn rollback_features(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        self.set_property(ids, PropertyChange::State(RegionState::Rollback))
    }

    pub fn select(&mut self, ids: &[ShapeId], selected: bool) -> Vec<ShapeId> {
        self.set_property(ids, PropertyChange::Selected(selected))
    }
}
