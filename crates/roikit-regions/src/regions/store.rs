//! Store batches, reconciliation and the async session.
//!
//! Storing is split in three steps so no lock is held while the backend
//! works: [`RegionCollection::prepare_store`] builds the batch,
//! the backend persists it, and [`RegionCollection::reconcile_store`] folds
//! the response back in. [`RegionsSession`] runs the three steps.

use parking_lot::Mutex;
use roikit_core::{
    PersistRequest, PersistResponse, PersistenceError, PersistenceEvent, RegionState,
    RegionsBackend, ShapeId,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::RegionCollection;
use crate::conversion::{to_json_object, RoisBatch};

/// Result of a store round trip as seen by the client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreOutcome {
    /// Old id to final id; shapes dropped client-side map to themselves
    pub shapes: BTreeMap<ShapeId, ShapeId>,
    pub errors: Vec<String>,
}

impl StoreOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl RegionCollection {
    /// Stored rois whose shapes are all deleted.
    pub fn empty_roi_ids(&self) -> HashSet<i64> {
        let mut candidates: HashSet<i64> = HashSet::new();
        let mut kept: HashSet<i64> = HashSet::new();
        for feature in self.features.values() {
            let roi_id = feature.id.roi_id;
            if roi_id < 0 {
                continue;
            }
            if feature.is_deleted() {
                candidates.insert(roi_id);
            } else {
                kept.insert(roi_id);
            }
        }
        candidates.retain(|roi_id| !kept.contains(roi_id));
        candidates
    }

    /// Builds the store batch for the given features, or for all of them.
    pub fn prepare_store(&self, ids: Option<&[ShapeId]>) -> RoisBatch {
        let empty_rois = self.empty_roi_ids();
        let separate = self.options.separate_roi_per_new_shape;
        match ids {
            Some(ids) => to_json_object(
                ids.iter().filter_map(|id| self.features.get(id)),
                separate,
                &empty_rois,
            ),
            None => to_json_object(self.features(), separate, &empty_rois),
        }
    }

    /// Applies the backend's answer to a store request.
    ///
    /// On success stored shapes take their final ids and state DEFAULT,
    /// deleted ones leave the collection, as do the shapes the batch dropped
    /// client-side. Ids no longer present are ignored. On failure nothing
    /// changes. Either way one notification reports the outcome.
    pub fn reconcile_store(
        &mut self,
        batch: &RoisBatch,
        result: Result<PersistResponse, PersistenceError>,
        omit_client_update: bool,
    ) -> StoreOutcome {
        let outcome = match result {
            Ok(response) => self.apply_store_response(batch, response),
            Err(err) => {
                tracing::error!(image_id = self.image_id, error = %err, "Storing regions failed");
                StoreOutcome {
                    shapes: BTreeMap::new(),
                    errors: vec![err.to_string()],
                }
            }
        };
        self.notify(PersistenceEvent::StoredShapes {
            shapes: outcome.shapes.clone(),
            errors: outcome.errors.clone(),
            omit_client_update,
        });
        outcome
    }

    fn apply_store_response(&mut self, batch: &RoisBatch, response: PersistResponse) -> StoreOutcome {
        let mut shapes = BTreeMap::new();
        for (old_id, new_id) in response.ids {
            let Some(feature) = self.features.get_mut(&old_id) else {
                tracing::debug!(shape_id = %old_id, "Stored shape no longer present");
                continue;
            };
            if feature.state == RegionState::Removed {
                self.remove_feature(&old_id);
            } else {
                feature.state = RegionState::Default;
                feature.old_state = None;
                self.rekey_feature(&old_id, new_id);
            }
            shapes.insert(old_id, new_id);
        }

        for id in &batch.new_and_deleted {
            if self.remove_feature(id).is_some() {
                shapes.insert(*id, *id);
            }
        }

        tracing::info!(
            image_id = self.image_id,
            stored = shapes.len(),
            errors = response.errors.len(),
            "Regions stored"
        );
        StoreOutcome {
            shapes,
            errors: response.errors,
        }
    }
}

/// Clears the reload flag when the reload ends, however it ends.
struct ReloadGuard<'a>(&'a AtomicBool);

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A region collection bound to a backend
pub struct RegionsSession {
    regions: Arc<Mutex<RegionCollection>>,
    backend: Arc<dyn RegionsBackend>,
    reloading: AtomicBool,
}

impl RegionsSession {
    pub fn new(regions: RegionCollection, backend: Arc<dyn RegionsBackend>) -> Self {
        Self {
            regions: Arc::new(Mutex::new(regions)),
            backend,
            reloading: AtomicBool::new(false),
        }
    }

    pub fn regions(&self) -> &Arc<Mutex<RegionCollection>> {
        &self.regions
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading.load(Ordering::Acquire)
    }

    /// Stores changed shapes (the given ones, or all).
    ///
    /// Returns `None` without contacting the backend when there is nothing
    /// to store or clean up.
    pub async fn store_regions(
        &self,
        ids: Option<&[ShapeId]>,
        omit_client_update: bool,
    ) -> Option<StoreOutcome> {
        let (batch, request) = {
            let regions = self.regions.lock();
            let batch = regions.prepare_store(ids);
            if batch.is_empty() {
                tracing::debug!("Nothing to store");
                return None;
            }
            let request = PersistRequest {
                image_id: regions.image_id(),
                rois: batch.to_value(),
            };
            (batch, request)
        };

        let result = self.backend.persist_rois(&request).await;
        let outcome = self
            .regions
            .lock()
            .reconcile_store(&batch, result, omit_client_update);
        Some(outcome)
    }

    /// Rebuilds the features, from fresh server data with `force_reload`.
    ///
    /// Only one forced reload runs at a time; another one requested meanwhile
    /// fails with [`PersistenceError::ReloadInFlight`] and changes nothing.
    /// Returns the number of features loaded.
    pub async fn update_regions(&self, force_reload: bool) -> Result<usize, PersistenceError> {
        if !force_reload {
            return Ok(self.regions.lock().update_regions());
        }
        if self
            .reloading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Regions reload requested while another is in flight");
            return Err(PersistenceError::ReloadInFlight);
        }
        let _guard = ReloadGuard(&self.reloading);

        let image_id = self.regions.lock().image_id();
        let rois = self.backend.fetch_rois(image_id).await.map_err(|err| {
            tracing::error!(image_id, error = %err, "Fetching regions failed");
            err
        })?;
        Ok(self.regions.lock().load_regions(rois))
    }
}
