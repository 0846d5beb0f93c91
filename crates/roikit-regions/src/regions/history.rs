//! Undo/redo history.
//!
//! An entry is opened with the geometries before an edit and closed with the
//! geometries after it. Only closed entries can be undone or redone; an entry
//! that is never closed is discarded.

use roikit_core::{ChangedProperty, HistoryEvent, PropertyEvent, RegionState, ShapeId};
use std::collections::BTreeMap;

use super::RegionCollection;
use crate::model::Geometry;

/// Before and after snapshot of one feature
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub old_state: RegionState,
    pub new_state: RegionState,
    pub old_value: Option<Geometry>,
    pub new_value: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Old values recorded, waiting for the new ones
    Pending,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub status: EntryStatus,
    pub records: BTreeMap<ShapeId, HistoryRecord>,
}

impl HistoryEntry {
    fn new() -> Self {
        Self {
            status: EntryStatus::Pending,
            records: BTreeMap::new(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.records.is_empty()
            && self
                .records
                .values()
                .all(|r| r.old_value.is_some() && r.new_value.is_some())
    }
}

#[derive(Debug)]
pub(crate) struct History {
    last_id: u64,
    entries: BTreeMap<u64, HistoryEntry>,
    limit: usize,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            last_id: 0,
            entries: BTreeMap::new(),
            limit,
        }
    }

    fn open(&mut self) -> u64 {
        self.last_id += 1;
        self.entries.insert(self.last_id, HistoryEntry::new());
        self.last_id
    }

    /// Drops the oldest closed entries beyond the limit.
    fn prune(&mut self) {
        if self.limit == 0 {
            return;
        }
        let closed: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, e)| e.status == EntryStatus::Closed)
            .map(|(id, _)| *id)
            .collect();
        for id in closed.iter().take(closed.len().saturating_sub(self.limit)) {
            self.entries.remove(id);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl RegionCollection {
    /// Records the current geometry of features in a history entry.
    ///
    /// Without `hist_id` a new entry is opened; otherwise the values are
    /// added to that entry. `is_old_value` selects the before or the after
    /// snapshot. An entry closes once every feature has both. Returns the
    /// entry id, `None` if there was nothing to record.
    pub fn add_history(
        &mut self,
        ids: &[ShapeId],
        is_old_value: bool,
        hist_id: Option<u64>,
    ) -> Option<u64> {
        let known: Vec<ShapeId> = ids
            .iter()
            .filter(|id| self.features.contains_key(id))
            .copied()
            .collect();
        if known.is_empty() {
            return None;
        }
        let hist_id = match hist_id {
            Some(id) if self.history.entries.contains_key(&id) => id,
            Some(id) => {
                tracing::warn!(hist_id = id, "Unknown history entry");
                return None;
            }
            None => self.history.open(),
        };

        let entry = self.history.entries.get_mut(&hist_id)?;
        for id in &known {
            let Some(feature) = self.features.get(id) else {
                continue;
            };
            let record = entry.records.entry(*id).or_insert_with(|| HistoryRecord {
                old_state: feature.state,
                new_state: RegionState::Modified,
                old_value: None,
                new_value: None,
            });
            if is_old_value {
                record.old_value = Some(feature.geometry.clone());
            } else {
                record.new_value = Some(feature.geometry.clone());
            }
        }
        if entry.is_complete() {
            entry.status = EntryStatus::Closed;
            self.history.prune();
        }
        Some(hist_id)
    }

    pub fn history_entry(&self, hist_id: u64) -> Option<&HistoryEntry> {
        self.history.entries.get(&hist_id)
    }

    /// Removes an entry that was never closed.
    pub fn discard_history(&mut self, hist_id: u64) -> Option<HistoryEntry> {
        match self.history.entries.get(&hist_id) {
            Some(entry) if entry.status == EntryStatus::Pending => {
                self.history.entries.remove(&hist_id)
            }
            _ => None,
        }
    }

    /// Undoes (`undo == true`) or redoes a closed entry.
    ///
    /// Geometry and state are restored for every recorded feature still in
    /// the collection. Features whose state changes are reported as modified
    /// unless they returned to DEFAULT.
    pub fn do_history(&mut self, hist_id: u64, undo: bool) -> bool {
        let entry = match self.history.entries.get(&hist_id) {
            Some(entry) if entry.status == EntryStatus::Closed => entry.clone(),
            _ => return false,
        };

        let mut shapes = Vec::new();
        let mut values = Vec::new();
        for (id, record) in &entry.records {
            let (geometry, state) = if undo {
                (&record.old_value, record.old_state)
            } else {
                (&record.new_value, record.new_state)
            };
            let Some(geometry) = geometry.clone() else {
                continue;
            };
            let Some(feature) = self.features.get_mut(id) else {
                continue;
            };
            feature.geometry = geometry;
            if feature.state != state {
                feature.state = state;
                shapes.push(*id);
                values.push(state != RegionState::Default);
            }
            let mut feature = feature.clone();
            self.measure(&mut feature, true);
            self.features.insert(*id, feature);
        }

        if !shapes.is_empty() {
            self.notify(PropertyEvent::Changed {
                properties: vec![ChangedProperty::Modified; shapes.len()],
                shapes,
                values,
            });
        }
        self.notify(HistoryEvent::EntryApplied { hist_id, undo });
        true
    }
}
