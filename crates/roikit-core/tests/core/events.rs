use parking_lot::Mutex;
use roikit_core::{
    AppEvent, EventBus, EventCategory, EventFilter, HistoryEvent, PersistenceEvent, ShapeId,
};
use std::collections::BTreeMap;
use std::sync::Arc;

fn stored_event() -> AppEvent {
    let mut shapes = BTreeMap::new();
    shapes.insert(ShapeId::new(-1, -3), ShapeId::new(8, 21));
    shapes.insert(ShapeId::new(4, 4), ShapeId::new(4, 4));
    PersistenceEvent::StoredShapes {
        shapes,
        errors: vec![],
        omit_client_update: false,
    }
    .into()
}

#[tokio::test]
async fn test_async_receiver_sees_published_events() {
    let bus = EventBus::new();
    let mut receiver = bus.receiver();
    assert_eq!(bus.publish(stored_event()).ok(), Some(1));

    let event = receiver.recv().await.expect("event");
    assert_eq!(event.category(), EventCategory::Persistence);
    assert_eq!(event, stored_event());
}

#[test]
fn test_category_filter_limits_handlers() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = bus.subscribe(
        EventFilter::Categories(vec![EventCategory::History]),
        move |event| sink.lock().push(event.clone()),
    );

    bus.publish(stored_event()).ok();
    bus.publish(
        HistoryEvent::EntryApplied {
            hist_id: 4,
            undo: true,
        }
        .into(),
    )
    .ok();
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(seen.lock()[0].category(), EventCategory::History);

    assert!(bus.unsubscribe(id));
    assert!(bus.publish(stored_event()).is_err());
}

#[test]
fn test_events_serialize_with_string_ids() {
    let json = serde_json::to_value(stored_event()).expect("serialize");
    let text = json.to_string();
    assert!(text.contains("\"-1:-3\":\"8:21\""));

    let back: AppEvent = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, stored_event());
}

#[tokio::test]
async fn test_emit_publishes_on_the_global_bus() {
    let mut receiver = roikit_core::event_bus().receiver();
    let reached = roikit_core::emit!(HistoryEvent::EntryApplied {
        hist_id: 9,
        undo: false,
    });
    assert!(reached.is_ok_and(|receivers| receivers >= 1));
    assert_eq!(
        receiver.recv().await.expect("event").category(),
        EventCategory::History
    );
}
