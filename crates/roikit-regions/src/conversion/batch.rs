//! Batch serialization ahead of a store request.

use roikit_core::{RegionState, ShapeId};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::shape::{feature_to_json_object, JsonObject};
use crate::feature::Feature;

/// Changed shapes bucketed by what the server has to do with them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoisBatch {
    /// Shapes across all buckets
    pub count: usize,
    /// Deleted shapes of rois that are deleted as a whole, by roi id
    pub empty_rois: BTreeMap<i64, Vec<ShapeId>>,
    /// Shapes the client simply drops: never stored, or not deletable
    pub new_and_deleted: Vec<ShapeId>,
    /// Deleted shapes by roi id
    pub deleted: BTreeMap<i64, Vec<ShapeId>>,
    #[serde(rename = "new")]
    pub new_shapes: Vec<JsonObject>,
    pub modified: Vec<JsonObject>,
}

impl RoisBatch {
    /// Nothing to send and nothing to clean up.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.new_and_deleted.is_empty()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Hands out negative roi ids for shapes that go into new rois.
struct NewRoiIds {
    next: i64,
    shared: Option<i64>,
}

impl NewRoiIds {
    fn new() -> Self {
        Self {
            next: -1,
            shared: None,
        }
    }

    fn fresh(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }

    fn shared(&mut self) -> i64 {
        match self.shared {
            Some(id) => id,
            None => {
                let id = self.fresh();
                self.shared = Some(id);
                id
            }
        }
    }
}

fn tagged(mut object: JsonObject, old_id: ShapeId) -> JsonObject {
    object.insert("oldId".to_string(), Value::from(old_id.to_string()));
    object
}

/// Buckets changed features for a store request.
///
/// Unchanged features are skipped. Deleted features are dropped client-side
/// when they were never stored or may not be deleted, and listed per roi
/// otherwise (under `empty_rois` for rois in `empty_rois`). Modified features
/// without edit permission are skipped; stored ones go to `modified`.
/// Everything else is new and grouped by target roi: a fresh negative roi
/// per shape with `separate_roi_per_new_shape`, otherwise unsaved rois share
/// one negative roi id and stored rois keep theirs.
pub fn to_json_object<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    separate_roi_per_new_shape: bool,
    empty_rois: &HashSet<i64>,
) -> RoisBatch {
    let mut batch = RoisBatch::default();
    let mut new_roi_ids = NewRoiIds::new();
    let mut rois: Vec<(i64, Vec<JsonObject>)> = Vec::new();

    for feature in features {
        let id = feature.id;
        let roi_to_use = match feature.state {
            RegionState::Default | RegionState::Rollback => continue,
            RegionState::Removed => {
                if id.is_unsaved() || !feature.permissions.can_delete {
                    batch.new_and_deleted.push(id);
                } else if empty_rois.contains(&id.roi_id) {
                    batch.empty_rois.entry(id.roi_id).or_default().push(id);
                } else {
                    batch.deleted.entry(id.roi_id).or_default().push(id);
                }
                batch.count += 1;
                continue;
            }
            RegionState::Modified if !feature.permissions.can_edit => continue,
            RegionState::Modified if id.is_persisted() => {
                if let Some(object) = feature_to_json_object(feature, Some(id.shape_id), Some(id.roi_id)) {
                    batch.modified.push(tagged(object, id));
                    batch.count += 1;
                }
                continue;
            }
            RegionState::Modified | RegionState::Added => {
                if separate_roi_per_new_shape
                    && (feature.state == RegionState::Added || id.is_unsaved())
                {
                    new_roi_ids.fresh()
                } else if id.roi_id < 0 {
                    new_roi_ids.shared()
                } else {
                    id.roi_id
                }
            }
        };

        let Some(object) = feature_to_json_object(feature, Some(id.shape_id), Some(roi_to_use)) else {
            continue;
        };
        match rois.iter_mut().find(|(roi, _)| *roi == roi_to_use) {
            Some((_, shapes)) => shapes.push(tagged(object, id)),
            None => rois.push((roi_to_use, vec![tagged(object, id)])),
        }
        batch.count += 1;
    }

    batch.new_shapes = rois.into_iter().flat_map(|(_, shapes)| shapes).collect();
    tracing::debug!(
        count = batch.count,
        new = batch.new_shapes.len(),
        modified = batch.modified.len(),
        "Prepared rois batch"
    );
    batch
}
