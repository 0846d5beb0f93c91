use async_trait::async_trait;
use parking_lot::Mutex;
use roikit_core::{
    PersistRequest, PersistResponse, PersistenceError, PlanePosition, RegionState,
    RegionsBackend, ShapeId,
};
use roikit_regions::{
    Feature, Geometry, Point, RegionCollection, RegionsOptions, RegionsSession,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Notify;

/// Backend double that records requests and answers from canned data
#[derive(Default)]
struct MockBackend {
    requests: Mutex<Vec<PersistRequest>>,
    ids: BTreeMap<ShapeId, ShapeId>,
    fail_persist: bool,
    rois: Vec<Value>,
    /// Holds `fetch_rois` until notified
    fetch_gate: Option<Arc<Notify>>,
}

#[async_trait]
impl RegionsBackend for MockBackend {
    async fn persist_rois(
        &self,
        request: &PersistRequest,
    ) -> Result<PersistResponse, PersistenceError> {
        self.requests.lock().push(request.clone());
        if self.fail_persist {
            return Err(PersistenceError::Backend {
                message: "connection reset".to_string(),
            });
        }
        Ok(PersistResponse {
            ids: self.ids.clone(),
            errors: Vec::new(),
        })
    }

    async fn fetch_rois(&self, _image_id: i64) -> Result<Vec<Value>, PersistenceError> {
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        Ok(self.rois.clone())
    }
}

fn server_rois() -> Vec<Value> {
    vec![json!({
        "@id": 5,
        "shapes": [
            {
                "@id": 50,
                "@type": "http://www.openmicroscopy.org/Schemas/OME/2016-06#Rectangle",
                "X": 1, "Y": 2, "Width": 3, "Height": 4,
                "TheZ": 0, "TheT": 0,
                "omero:details": {
                    "permissions": {"canEdit": true, "canDelete": true, "canAnnotate": true}
                }
            },
            {
                "@id": 51,
                "@type": "http://www.openmicroscopy.org/Schemas/OME/2016-06#Point",
                "X": 10, "Y": 10,
                "omero:details": {"permissions": {"canEdit": false, "canDelete": false}}
            }
        ]
    })]
}

fn session(backend: MockBackend) -> (RegionsSession, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let regions = RegionCollection::new(
        3,
        PlanePosition::new(0, 0, vec![0]),
        RegionsOptions::default(),
    );
    (RegionsSession::new(regions, backend.clone()), backend)
}

fn unsaved_point(shape: i64) -> Feature {
    let point = Point::new(4.0, -4.0, None).expect("valid");
    Feature::new(ShapeId::new(-1, shape), Geometry::Point(point)).with_state(RegionState::Added)
}

#[tokio::test]
async fn test_store_without_changes_sends_nothing() {
    let (session, backend) = session(MockBackend::default());
    assert!(session.store_regions(None, false).await.is_none());
    assert!(backend.requests.lock().is_empty());
}

#[tokio::test]
async fn test_store_assigns_server_ids() {
    let mut ids = BTreeMap::new();
    ids.insert(ShapeId::new(-1, -9), ShapeId::new(6, 60));
    let (session, backend) = session(MockBackend {
        ids,
        ..MockBackend::default()
    });
    session.regions().lock().add_feature(unsaved_point(-9));

    let outcome = session.store_regions(None, false).await.expect("request sent");
    assert!(outcome.is_success());
    assert_eq!(
        outcome.shapes.get(&ShapeId::new(-1, -9)),
        Some(&ShapeId::new(6, 60))
    );

    let requests = backend.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].image_id, 3);
    assert_eq!(requests[0].rois["new"].as_array().map(Vec::len), Some(1));
    assert_eq!(requests[0].rois["count"], 1);

    let regions = session.regions().lock();
    assert!(!regions.contains(&ShapeId::new(-1, -9)));
    assert_eq!(
        regions.get(&ShapeId::new(6, 60)).map(|f| f.state),
        Some(RegionState::Default)
    );
}

#[tokio::test]
async fn test_failed_store_keeps_local_state() {
    let (session, _backend) = session(MockBackend {
        fail_persist: true,
        ..MockBackend::default()
    });
    session.regions().lock().add_feature(unsaved_point(-10));

    let outcome = session.store_regions(None, true).await.expect("request sent");
    assert!(!outcome.is_success());
    assert!(outcome.shapes.is_empty());
    assert_eq!(
        session.regions().lock().get(&ShapeId::new(-1, -10)).map(|f| f.state),
        Some(RegionState::Added)
    );
}

#[tokio::test]
async fn test_forced_reload_fetches_features() {
    let (session, _backend) = session(MockBackend {
        rois: server_rois(),
        ..MockBackend::default()
    });
    assert_eq!(session.update_regions(true).await.ok(), Some(2));

    {
        let regions = session.regions().lock();
        let rect = regions.get(&ShapeId::new(5, 50)).expect("rectangle");
        assert_eq!(rect.area, Some(12.0));
        assert_eq!((rect.the_z, rect.the_t), (0, 0));
        let point = regions.get(&ShapeId::new(5, 51)).expect("point");
        assert!(!point.permissions.can_edit);
    }

    session.regions().lock().add_feature(unsaved_point(-11));
    assert_eq!(session.update_regions(false).await.ok(), Some(3));
    assert!(session.regions().lock().contains(&ShapeId::new(-1, -11)));
}

#[tokio::test]
async fn test_second_forced_reload_is_refused() {
    let gate = Arc::new(Notify::new());
    let (session, _backend) = session(MockBackend {
        rois: server_rois(),
        fetch_gate: Some(gate.clone()),
        ..MockBackend::default()
    });
    let session = Arc::new(session);

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.update_regions(true).await }
    });
    while !session.is_reloading() {
        tokio::task::yield_now().await;
    }

    assert!(matches!(
        session.update_regions(true).await,
        Err(PersistenceError::ReloadInFlight)
    ));
    assert!(session.regions().lock().is_empty());

    gate.notify_one();
    let loaded = first.await.expect("reload task");
    assert_eq!(loaded.ok(), Some(2));
    assert!(!session.is_reloading());
}
