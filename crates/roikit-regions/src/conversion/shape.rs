//! Feature to wire JSON.
//!
//! One routine per shape kind writes the geometric fields (y flipped back to
//! image convention) and the optional `Transform` block. Style and plane
//! attachment are layered on afterwards by [`feature_to_json_object`].

use roikit_core::{ConversionError, GeometryError};
use serde_json::{json, Map, Value};

use crate::feature::Feature;
use crate::model::{Coord, Geometry, RegionShape, ShapeKind};
use crate::style::DEFAULT_STROKE_WIDTH;
use crate::transform::transform_object_from_matrix;

/// Namespace of the shape `@type` uris.
pub const SCHEMA_URI: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";
/// `@type` of length values such as `StrokeWidth` and `FontSize`.
pub const LENGTH_TYPE: &str = "TBD#LengthI";
/// Marker value for arrowheads on lines.
pub const ARROW_MARKER: &str = "Arrow";

pub type JsonObject = Map<String, Value>;

pub fn schema_type(kind: ShapeKind) -> String {
    format!("{}#{}", SCHEMA_URI, kind.schema_name())
}

/// Integral values are written as integers, like the server sends them.
pub(crate) fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Model y to image y, without producing `-0`.
fn flip(y: f64) -> f64 {
    -y + 0.0
}

fn wrong_geometry(expected: ShapeKind, actual: &Geometry) -> ConversionError {
    GeometryError::WrongGeometry {
        expected: expected.to_string(),
        actual: actual.kind().to_string(),
    }
    .into()
}

fn base_object(kind: ShapeKind, shape_id: Option<i64>) -> JsonObject {
    let mut object = Map::new();
    if let Some(id) = shape_id {
        object.insert("@id".to_string(), Value::from(id));
    }
    object.insert("@type".to_string(), Value::from(schema_type(kind)));
    object
}

fn insert_transform(object: &mut JsonObject, geometry: &Geometry) {
    if let Some(transform) = geometry.transform().and_then(|m| transform_object_from_matrix(m)) {
        object.insert("Transform".to_string(), transform);
    }
}

fn insert_numbers(object: &mut JsonObject, fields: &[(&str, f64)]) {
    for (key, value) in fields {
        object.insert(key.to_string(), number(*value));
    }
}

/// Formats coordinates as `"x,y x,y ..."` in image convention.
pub fn points_to_string(coords: &[Coord]) -> String {
    coords
        .iter()
        .map(|[x, y]| format!("{},{}", x + 0.0, flip(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `"x,y x,y ..."` into model coordinates (y negated).
///
/// Empty tokens are ignored. A token without two numbers fails the whole string.
pub fn convert_point_string_into_coords(points: &str) -> Result<Vec<Coord>, ConversionError> {
    let invalid = || ConversionError::InvalidPointString {
        value: points.to_string(),
    };
    points
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut parts = token.split(',');
            let x = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
            let y = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
            match (x, y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok([x, -y]),
                _ => Err(invalid()),
            }
        })
        .collect()
}

pub fn point_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Point(point) = geometry else {
        return Err(wrong_geometry(ShapeKind::Point, geometry));
    };
    let [x, y] = point.point_coordinates();
    let mut object = base_object(ShapeKind::Point, shape_id);
    insert_numbers(&mut object, &[("X", x), ("Y", flip(y))]);
    insert_transform(&mut object, geometry);
    Ok(object)
}

pub fn ellipse_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Ellipse(ellipse) = geometry else {
        return Err(wrong_geometry(ShapeKind::Ellipse, geometry));
    };
    let [cx, cy] = ellipse.center();
    let [rx, ry] = ellipse.radius();
    let mut object = base_object(ShapeKind::Ellipse, shape_id);
    insert_numbers(
        &mut object,
        &[("X", cx), ("Y", flip(cy)), ("RadiusX", rx), ("RadiusY", ry)],
    );
    insert_transform(&mut object, geometry);
    Ok(object)
}

pub fn rectangle_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Rectangle(rect) = geometry else {
        return Err(wrong_geometry(ShapeKind::Rectangle, geometry));
    };
    let [x, y] = rect.upper_left_corner();
    let mut object = base_object(ShapeKind::Rectangle, shape_id);
    insert_numbers(
        &mut object,
        &[
            ("X", x),
            ("Y", flip(y)),
            ("Width", rect.width()),
            ("Height", rect.height()),
        ],
    );
    insert_transform(&mut object, geometry);
    Ok(object)
}

fn insert_markers(object: &mut JsonObject, has_start_arrow: bool, has_end_arrow: bool) {
    if has_start_arrow {
        object.insert("MarkerStart".to_string(), Value::from(ARROW_MARKER));
    }
    if has_end_arrow {
        object.insert("MarkerEnd".to_string(), Value::from(ARROW_MARKER));
    }
}

/// Two-point lines only, polylines are handed to [`polyline_to_json`].
pub fn line_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Line(line) = geometry else {
        return Err(wrong_geometry(ShapeKind::Line, geometry));
    };
    if line.is_polyline() {
        return polyline_to_json(geometry, shape_id);
    }
    let coords = line.line_coordinates();
    let mut object = base_object(ShapeKind::Line, shape_id);
    insert_numbers(
        &mut object,
        &[
            ("X1", coords[0][0]),
            ("Y1", flip(coords[0][1])),
            ("X2", coords[1][0]),
            ("Y2", flip(coords[1][1])),
        ],
    );
    insert_markers(&mut object, line.has_start_arrow, line.has_end_arrow);
    insert_transform(&mut object, geometry);
    Ok(object)
}

pub fn polyline_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Line(line) = geometry else {
        return Err(wrong_geometry(ShapeKind::Polyline, geometry));
    };
    if !line.is_polyline() {
        return line_to_json(geometry, shape_id);
    }
    let mut object = base_object(ShapeKind::Polyline, shape_id);
    object.insert(
        "Points".to_string(),
        Value::from(points_to_string(line.line_coordinates())),
    );
    insert_markers(&mut object, line.has_start_arrow, line.has_end_arrow);
    insert_transform(&mut object, geometry);
    Ok(object)
}

/// Labels only carry their anchor; the size follows from the text.
pub fn label_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Label(label) = geometry else {
        return Err(wrong_geometry(ShapeKind::Label, geometry));
    };
    let [x, y] = label.upper_left_corner();
    let mut object = base_object(ShapeKind::Label, shape_id);
    insert_numbers(&mut object, &[("X", x), ("Y", flip(y))]);
    Ok(object)
}

pub fn polygon_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Polygon(polygon) = geometry else {
        return Err(wrong_geometry(ShapeKind::Polygon, geometry));
    };
    let mut object = base_object(ShapeKind::Polygon, shape_id);
    object.insert(
        "Points".to_string(),
        Value::from(points_to_string(polygon.source_coordinates())),
    );
    insert_transform(&mut object, geometry);
    Ok(object)
}

pub fn mask_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    let Geometry::Mask(mask) = geometry else {
        return Err(wrong_geometry(ShapeKind::Mask, geometry));
    };
    let [x, y] = mask.point_coordinates();
    let [width, height] = mask.size();
    let mut object = base_object(ShapeKind::Mask, shape_id);
    insert_numbers(
        &mut object,
        &[("X", x), ("Y", flip(y)), ("Width", width), ("Height", height)],
    );
    insert_transform(&mut object, geometry);
    Ok(object)
}

pub fn geometry_to_json(geometry: &Geometry, shape_id: Option<i64>) -> Result<JsonObject, ConversionError> {
    match geometry {
        Geometry::Point(_) => point_to_json(geometry, shape_id),
        Geometry::Line(_) => line_to_json(geometry, shape_id),
        Geometry::Polygon(_) => polygon_to_json(geometry, shape_id),
        Geometry::Rectangle(_) => rectangle_to_json(geometry, shape_id),
        Geometry::Ellipse(_) => ellipse_to_json(geometry, shape_id),
        Geometry::Label(_) => label_to_json(geometry, shape_id),
        Geometry::Mask(_) => mask_to_json(geometry, shape_id),
    }
}

fn length_object(unit: &str, symbol: &str, value: Value) -> Value {
    json!({
        "@type": LENGTH_TYPE,
        "Unit": unit,
        "Symbol": symbol,
        "Value": value,
    })
}

/// Writes colors, stroke width, text and font of the feature's own style.
///
/// Labels are colored by their text fill, for both fill and stroke.
pub fn integrate_style_into_json_object(feature: &Feature, object: &mut JsonObject) {
    let style = &feature.style;
    let label_color = if feature.is_label() { style.text.fill } else { None };

    if let Some(fill) = label_color.or(style.fill) {
        object.insert("FillColor".to_string(), Value::from(fill.to_signed_integer()));
    }
    if let Some(stroke) = label_color.or(style.stroke.map(|s| s.color)) {
        object.insert("StrokeColor".to_string(), Value::from(stroke.to_signed_integer()));
    }
    let width = style.stroke.map(|s| s.width).unwrap_or(DEFAULT_STROKE_WIDTH);
    object.insert(
        "StrokeWidth".to_string(),
        length_object("PIXEL", "px", number(width)),
    );

    if !style.text.text.is_empty() {
        object.insert("Text".to_string(), Value::from(style.text.text.clone()));
    }
    let font = &style.text.font;
    object.insert("FontStyle".to_string(), Value::from(font.style.clone()));
    object.insert(
        "FontSize".to_string(),
        length_object("POINT", "pt", Value::from(font.size.trunc() as i64)),
    );
    object.insert("FontFamily".to_string(), Value::from(font.family.clone()));
}

/// Writes plane attachment (attached planes only) and cached measurements.
pub fn integrate_misc_info_into_json_object(feature: &Feature, object: &mut JsonObject) {
    for (key, index) in [
        ("TheZ", feature.the_z),
        ("TheT", feature.the_t),
        ("TheC", feature.the_c),
    ] {
        if index >= 0 {
            object.insert(key.to_string(), Value::from(index));
        }
    }
    if let Some(area) = feature.area {
        object.insert("Area".to_string(), number(area));
    }
    if let Some(length) = feature.length {
        object.insert("Length".to_string(), number(length));
    }
}

/// Serializes a feature, logging and returning `None` on failure.
///
/// `shape_id` defaults to the feature's own. No `@id` is written when the
/// shape goes into a new roi (negative `roi_id`).
pub fn feature_to_json_object(
    feature: &Feature,
    shape_id: Option<i64>,
    roi_id: Option<i64>,
) -> Option<JsonObject> {
    let shape_id = shape_id.unwrap_or(feature.id.shape_id);
    let written_id = match roi_id {
        Some(roi) if roi < 0 => None,
        _ => Some(shape_id),
    };
    match geometry_to_json(&feature.geometry, written_id) {
        Ok(mut object) => {
            integrate_style_into_json_object(feature, &mut object);
            integrate_misc_info_into_json_object(feature, &mut object);
            Some(object)
        }
        Err(err) => {
            tracing::error!(
                shape_type = %feature.kind(),
                shape_id = %feature.id,
                error = %err,
                "Failed to convert shape to json"
            );
            None
        }
    }
}
