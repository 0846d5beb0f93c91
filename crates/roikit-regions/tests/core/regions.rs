use roikit_core::{
    AppEvent, ChangedProperty, EventBus, EventBusConfig, PlanePosition, Projection,
    PropertyEvent, RegionState, ShapeId, ZRange,
};
use roikit_regions::{
    Feature, Geometry, PropertyChange, Rectangle, RegionCollection, RegionShape, RegionsOptions,
};
use std::sync::Arc;

fn collection() -> RegionCollection {
    let bus = Arc::new(EventBus::with_config(EventBusConfig {
        record_replay: true,
        ..EventBusConfig::default()
    }));
    RegionCollection::with_event_bus(
        11,
        PlanePosition::new(0, 0, vec![0]),
        RegionsOptions::default(),
        bus,
    )
}

fn rect(roi: i64, shape: i64, x: f64) -> Feature {
    let rect = Rectangle::new(x, 0.0, 10.0, 10.0, None).expect("valid");
    Feature::new(ShapeId::new(roi, shape), Geometry::Rectangle(rect))
}

#[test]
fn test_deleting_an_unsaved_shape_leaves_nothing_to_store() {
    let mut regions = collection();
    let id = ShapeId::new(-1, -42);
    regions.add_feature(rect(-1, -42, 0.0).with_state(RegionState::Added));
    assert_eq!(regions.prepare_store(None).count, 1);

    assert_eq!(regions.delete_features(&[id]), vec![id]);
    assert!(!regions.contains(&id));
    assert!(regions.prepare_store(None).is_empty());

    let history = regions.events().replayed(None);
    let reported = history.iter().any(|event| {
        matches!(
            event,
            AppEvent::Property(PropertyEvent::Changed { shapes, properties, values })
                if shapes == &vec![id]
                    && properties == &vec![ChangedProperty::Deleted]
                    && values == &vec![true]
        )
    });
    assert!(reported);
}

#[test]
fn test_edited_unsaved_shape_is_dropped_on_delete() {
    let mut regions = collection();
    let id = ShapeId::new(-1, -43);
    regions.add_feature(rect(-1, -43, 0.0).with_state(RegionState::Added));
    regions.translate_features(&[id], 2.0, 0.0);
    assert_eq!(regions.get(&id).map(|f| f.state), Some(RegionState::Modified));

    regions.delete_features(&[id]);
    assert!(!regions.contains(&id));
}

#[test]
fn test_rollback_restores_state_before_delete() {
    let mut regions = collection();
    let edited = ShapeId::new(3, 7);
    let untouched = ShapeId::new(3, 8);
    regions.add_feature(rect(3, 7, 0.0));
    regions.add_feature(rect(3, 8, 20.0));

    regions.translate_features(&[edited], 1.0, 1.0);
    regions.delete_features(&[edited, untouched]);
    let deleted = regions.get(&edited).expect("feature");
    assert_eq!(deleted.state, RegionState::Removed);
    assert_eq!(deleted.old_state, Some(RegionState::Modified));

    regions.rollback_features(&[edited, untouched]);
    assert_eq!(regions.get(&edited).map(|f| f.state), Some(RegionState::Modified));
    assert_eq!(regions.get(&untouched).map(|f| f.state), Some(RegionState::Default));
}

#[test]
fn test_repeated_undo_and_redo_are_stable() {
    let mut regions = collection();
    let id = ShapeId::new(3, 7);
    regions.add_feature(rect(3, 7, 0.0));

    let hist_id = regions.begin_gesture(&[id]).expect("gesture");
    regions.translate_features(&[id], 4.0, 0.0);
    assert_eq!(regions.end_gesture(), Some(hist_id));
    let moved = regions.get(&id).map(|f| f.geometry.extent());

    assert!(regions.do_history(hist_id, true));
    let undone = regions.get(&id).map(|f| (f.geometry.extent(), f.state));
    assert!(regions.do_history(hist_id, true));
    assert_eq!(regions.get(&id).map(|f| (f.geometry.extent(), f.state)), undone);
    assert_eq!(undone, Some(([0.0, -10.0, 10.0, 0.0], RegionState::Default)));

    assert!(regions.do_history(hist_id, false));
    assert!(regions.do_history(hist_id, false));
    assert_eq!(regions.get(&id).map(|f| f.geometry.extent()), moved);
    assert_eq!(regions.get(&id).map(|f| f.state), Some(RegionState::Modified));
}

#[test]
fn test_rendering_follows_the_plane() {
    let mut regions = collection();
    regions.add_feature(rect(1, 1, 0.0).with_planes(0, 0, -1));
    regions.add_feature(rect(1, 2, 0.0).with_planes(1, 0, -1));
    regions.add_feature(rect(1, 3, 0.0).with_planes(-1, -1, 2));
    regions.add_feature(rect(1, 4, 0.0).with_planes(0, 1, 0));
    regions.add_feature(rect(1, 5, 0.0));

    let rendered = |regions: &RegionCollection| -> Vec<i64> {
        regions
            .rendered_features()
            .iter()
            .map(|f| f.id.shape_id)
            .collect()
    };
    assert_eq!(rendered(&regions), vec![1, 5]);

    regions.set_plane(
        PlanePosition::new(0, 0, vec![0, 2])
            .with_projection(Projection::IntMax(Some(ZRange { start: 0, end: 1 }))),
    );
    assert_eq!(rendered(&regions), vec![1, 2, 3, 5]);

    regions.set_property(&[ShapeId::new(1, 5)], PropertyChange::Visible(false));
    regions.delete_features(&[ShapeId::new(1, 2)]);
    assert_eq!(rendered(&regions), vec![1, 3]);
    assert_eq!(regions.features_in_extent(&[100.0, -5.0, 200.0, 0.0]).len(), 0);
}
