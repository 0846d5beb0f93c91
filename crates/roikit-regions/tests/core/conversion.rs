use proptest::prelude::*;
use roikit_core::{RegionState, ShapeId};
use roikit_regions::conversion::{
    convert_color_to_signed_integer, geometry_to_json, try_feature_factory, JsonObject,
    TextMetrics,
};
use roikit_regions::{to_json_object, Color, Feature, Geometry, Point};
use serde_json::{json, Value};
use std::collections::HashSet;

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn round_trip(value: Value) -> (JsonObject, JsonObject) {
    let mut shape = object(value);
    let feature = try_feature_factory(&mut shape, &TextMetrics::default()).expect("shape");
    let written = geometry_to_json(&feature.geometry, Some(7)).expect("json");
    (shape, written)
}

fn assert_fields_close(read: &JsonObject, written: &JsonObject, fields: &[&str]) {
    for field in fields {
        let a = read.get(*field).and_then(Value::as_f64).expect(field);
        let b = written.get(*field).and_then(Value::as_f64).expect(field);
        assert!((a - b).abs() < 1e-6, "{field}: {a} != {b}");
    }
}

#[test]
fn test_numeric_shapes_round_trip() {
    let cases = [
        (json!({"type": "point", "X": 12.5, "Y": 40}), vec!["X", "Y"]),
        (
            json!({"type": "ellipse", "X": 100, "Y": 80, "RadiusX": 20.25, "RadiusY": 7}),
            vec!["X", "Y", "RadiusX", "RadiusY"],
        ),
        (
            json!({"type": "rectangle", "X": 1000, "Y": 2000, "Width": 12, "Height": 15}),
            vec!["X", "Y", "Width", "Height"],
        ),
        (
            json!({"type": "line", "X1": 10, "Y1": 100, "X2": 25, "Y2": 20}),
            vec!["X1", "Y1", "X2", "Y2"],
        ),
        (
            json!({"type": "mask", "X": 3, "Y": 4, "Width": 64, "Height": 32}),
            vec!["X", "Y", "Width", "Height"],
        ),
    ];
    for (value, fields) in cases {
        let (read, written) = round_trip(value);
        assert_fields_close(&read, &written, &fields);
        assert_eq!(written["@id"], 7);
    }
}

#[test]
fn test_point_lists_round_trip() {
    let (_, polyline) = round_trip(json!({
        "type": "polyline",
        "Points": "4897,2756 4885,2786 4826,2904",
        "MarkerEnd": "Arrow"
    }));
    assert_eq!(polyline["Points"], "4897,2756 4885,2786 4826,2904");
    assert_eq!(polyline["MarkerEnd"], "Arrow");
    assert!(polyline.get("MarkerStart").is_none());

    let (_, polygon) = round_trip(json!({"type": "polygon", "Points": "0,0 10,0 10,10"}));
    assert_eq!(polygon["Points"], "0,0 10,0 10,10");
    assert!(polygon["@type"].as_str().is_some_and(|t| t.ends_with("#Polygon")));
}

#[test]
fn test_transform_survives_round_trip() {
    let (_, written) = round_trip(json!({
        "type": "rectangle",
        "X": 10, "Y": 10, "Width": 5, "Height": 5,
        "Transform": {
            "@type": "http://www.openmicroscopy.org/Schemas/OME/2016-06#AffineTransform",
            "A00": 0.5, "A10": 0.25, "A01": -0.25, "A11": 0.5, "A02": 30, "A12": -4
        }
    }));
    let transform = written.get("Transform").and_then(Value::as_object).expect("transform");
    for (key, expected) in [
        ("A00", 0.5),
        ("A10", 0.25),
        ("A01", -0.25),
        ("A11", 0.5),
        ("A02", 30.0),
        ("A12", -4.0),
    ] {
        let value = transform.get(key).and_then(Value::as_f64).expect(key);
        assert!((value - expected).abs() < 1e-6, "{key}");
    }
}

#[test]
fn test_unknown_or_incomplete_shapes_fail() {
    let mut unknown = object(json!({"type": "hexagon", "X": 1}));
    assert!(try_feature_factory(&mut unknown, &TextMetrics::default()).is_err());
    let mut incomplete = object(json!({"type": "rectangle", "X": 1, "Y": 1}));
    assert!(try_feature_factory(&mut incomplete, &TextMetrics::default()).is_err());
}

#[test]
fn test_color_strings_pack_into_integers() {
    assert_eq!(convert_color_to_signed_integer("#ffffff", Some(1.0)).ok(), Some(-1));
    assert_eq!(
        convert_color_to_signed_integer("rgba(0,0,255,1)", None).ok(),
        Some(0x0000_ffff)
    );
    assert!(convert_color_to_signed_integer("not a color", None).is_err());
}

proptest! {
    #[test]
    fn color_survives_packing(
        red in any::<u8>(),
        green in any::<u8>(),
        blue in any::<u8>(),
        alpha in 0.0f64..=1.0,
    ) {
        let color = Color::new(red, green, blue, alpha);
        let decoded = Color::from_signed_integer(color.to_signed_integer());
        prop_assert_eq!((decoded.red, decoded.green, decoded.blue), (red, green, blue));
        prop_assert!((decoded.alpha - alpha).abs() <= 1.0 / 255.0);
    }
}

#[test]
fn test_batch_splits_by_state() {
    let point = |roi, shape, state| {
        let geometry = Geometry::Point(Point::new(1.0, -1.0, None).expect("valid"));
        Feature::new(ShapeId::new(roi, shape), geometry).with_state(state)
    };
    let features = vec![
        point(1, 1, RegionState::Default),
        point(1, 2, RegionState::Modified),
        point(-1, -3, RegionState::Added),
        point(-1, -4, RegionState::Added),
        point(2, 5, RegionState::Removed),
    ];

    let shared = to_json_object(&features, false, &HashSet::new());
    assert_eq!(shared.count, 4);
    assert_eq!(shared.modified.len(), 1);
    assert_eq!(shared.new_shapes.len(), 2);
    assert_eq!(shared.deleted.get(&2), Some(&vec![ShapeId::new(2, 5)]));
    assert!(shared.new_shapes.iter().all(|shape| shape.get("@id").is_none()));

    let value = shared.to_value();
    assert_eq!(value["new"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["new"][0]["oldId"], "-1:-3");
}
