//! Wire JSON to features.

use roikit_core::{ConversionError, ShapeId};
use serde_json::{json, Value};

use super::shape::{convert_point_string_into_coords, JsonObject, ARROW_MARKER};
use crate::feature::Feature;
use crate::model::{Ellipse, Geometry, Label, Line, Mask, Point, Polygon, Rectangle, ShapeKind};
use crate::style::{
    create_feature_style, measure_text_dimensions, remedy_style_if_necessary, FontSpec,
    DEFAULT_CHAR_WIDTH_RATIO, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_STYLE,
};
use crate::transform::matrix_from_transform_object;

/// Placeholder id of freshly built features, callers assign the real one.
pub const UNASSIGNED_ID: ShapeId = ShapeId {
    roi_id: -1,
    shape_id: -1,
};

/// Parameters of the text size estimate used for labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Device pixel ratio of the display
    pub resolution: f64,
    pub char_width_ratio: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            char_width_ratio: DEFAULT_CHAR_WIDTH_RATIO,
        }
    }
}

/// Case-insensitive lookup of a shape type name; empty or unknown gives `None`.
pub fn lookup_feature_kind(type_name: &str) -> Option<ShapeKind> {
    if type_name.is_empty() {
        return None;
    }
    ShapeKind::from_type_name(type_name)
}

/// Shape kind of a wire object, from `type` or else the text after `#` in `@type`.
pub fn shape_kind_of(shape: &JsonObject) -> Option<ShapeKind> {
    if let Some(name) = shape.get("type").and_then(Value::as_str) {
        return lookup_feature_kind(name);
    }
    let schema_type = shape.get("@type").and_then(Value::as_str)?;
    let (_, name) = schema_type.rsplit_once('#')?;
    lookup_feature_kind(name)
}

fn required(shape: &JsonObject, kind: ShapeKind, field: &str) -> Result<f64, ConversionError> {
    shape
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ConversionError::MissingField {
            shape_type: kind.to_string(),
            field: field.to_string(),
        })
}

fn points(shape: &JsonObject, kind: ShapeKind) -> Result<Vec<[f64; 2]>, ConversionError> {
    let points = shape
        .get("Points")
        .and_then(Value::as_str)
        .ok_or_else(|| ConversionError::MissingField {
            shape_type: kind.to_string(),
            field: "Points".to_string(),
        })?;
    convert_point_string_into_coords(points)
}

fn has_arrow(shape: &JsonObject, marker: &str) -> bool {
    shape.get(marker).and_then(Value::as_str) == Some(ARROW_MARKER)
}

/// Fills in the text and font fields a label needs and returns its font.
fn remedy_label_fields(shape: &mut JsonObject) -> FontSpec {
    if !shape.get("Text").is_some_and(Value::is_string) {
        shape.insert("Text".to_string(), Value::from(""));
    }
    let size = shape
        .get("FontSize")
        .and_then(|size| size.get("Value"))
        .and_then(Value::as_f64);
    if size.is_none() {
        shape.insert(
            "FontSize".to_string(),
            json!({ "Value": DEFAULT_FONT_SIZE, "Unit": "PIXEL" }),
        );
    }
    let mut text_field = |key: &str, default: &str| match shape.get(key).and_then(Value::as_str) {
        Some(value) => value.to_string(),
        None => {
            shape.insert(key.to_string(), Value::from(default));
            default.to_string()
        }
    };
    let family = text_field("FontFamily", DEFAULT_FONT_FAMILY);
    let style = text_field("FontStyle", DEFAULT_FONT_STYLE);
    FontSpec {
        style,
        size: size.unwrap_or(DEFAULT_FONT_SIZE),
        family,
    }
}

/// Builds the geometry of `kind` from its wire fields.
///
/// Label defaults (text, font) are written back into `shape` so the style
/// sees the same values.
pub fn geometry_from_json(
    kind: ShapeKind,
    shape: &mut JsonObject,
    metrics: &TextMetrics,
) -> Result<Geometry, ConversionError> {
    let transform = shape.get("Transform").and_then(matrix_from_transform_object);
    let geometry = match kind {
        ShapeKind::Point => Geometry::Point(Point::new(
            required(shape, kind, "X")?,
            -required(shape, kind, "Y")?,
            transform,
        )?),
        ShapeKind::Ellipse => Geometry::Ellipse(Ellipse::new(
            required(shape, kind, "X")?,
            -required(shape, kind, "Y")?,
            required(shape, kind, "RadiusX")?,
            required(shape, kind, "RadiusY")?,
            transform,
        )?),
        ShapeKind::Rectangle => Geometry::Rectangle(Rectangle::new(
            required(shape, kind, "X")?,
            -required(shape, kind, "Y")?,
            required(shape, kind, "Width")?,
            required(shape, kind, "Height")?,
            transform,
        )?),
        ShapeKind::Line => {
            let start = [required(shape, kind, "X1")?, -required(shape, kind, "Y1")?];
            let end = [required(shape, kind, "X2")?, -required(shape, kind, "Y2")?];
            Geometry::Line(Line::new(
                vec![start, end],
                has_arrow(shape, "MarkerStart"),
                has_arrow(shape, "MarkerEnd"),
                transform,
            )?)
        }
        ShapeKind::Polyline => Geometry::Line(Line::new(
            points(shape, kind)?,
            has_arrow(shape, "MarkerStart"),
            has_arrow(shape, "MarkerEnd"),
            transform,
        )?),
        ShapeKind::Polygon => Geometry::Polygon(Polygon::new(points(shape, kind)?, transform)?),
        ShapeKind::Label => {
            let font = remedy_label_fields(shape);
            let text = shape.get("Text").and_then(Value::as_str).unwrap_or_default();
            let dimensions =
                measure_text_dimensions(text, &font, metrics.resolution, metrics.char_width_ratio);
            Geometry::Label(Label::new(
                required(shape, kind, "X")?,
                -required(shape, kind, "Y")?,
                Some(dimensions),
            )?)
        }
        ShapeKind::Mask => Geometry::Mask(Mask::new(
            required(shape, kind, "X")?,
            -required(shape, kind, "Y")?,
            required(shape, kind, "Width")?,
            required(shape, kind, "Height")?,
            transform,
        )?),
    };
    Ok(geometry)
}

/// Builds a styled feature from a wire shape object.
///
/// The feature gets [`UNASSIGNED_ID`]; plane attachment and permissions are
/// left at their defaults.
pub fn try_feature_factory(
    shape: &mut JsonObject,
    metrics: &TextMetrics,
) -> Result<Feature, ConversionError> {
    let kind = shape_kind_of(shape).ok_or_else(|| ConversionError::UnknownShapeType {
        type_name: shape
            .get("type")
            .or_else(|| shape.get("@type"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })?;
    remedy_style_if_necessary(shape, kind);
    let geometry = geometry_from_json(kind, shape, metrics)?;
    let style = create_feature_style(shape, matches!(kind, ShapeKind::Label | ShapeKind::Mask));
    Ok(Feature::new(UNASSIGNED_ID, geometry).with_style(style))
}

/// Like [`try_feature_factory`], but logs failures and returns `None`.
pub fn feature_factory(shape: &mut JsonObject, metrics: &TextMetrics) -> Option<Feature> {
    match try_feature_factory(shape, metrics) {
        Ok(feature) => Some(feature),
        Err(err) => {
            tracing::error!(error = %err, "Failed to create feature from shape json");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionShape;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        }
    }

    #[test]
    fn test_kind_from_schema_type() {
        let shape = object(json!({
            "@type": "http://www.openmicroscopy.org/Schemas/OME/2016-06#Polyline"
        }));
        assert_eq!(shape_kind_of(&shape), Some(ShapeKind::Polyline));
        assert_eq!(shape_kind_of(&object(json!({"type": "ELLIPSE"}))), Some(ShapeKind::Ellipse));
        assert_eq!(shape_kind_of(&object(json!({"type": ""}))), None);
        assert_eq!(shape_kind_of(&object(json!({"@type": "Rectangle"}))), None);
    }

    #[test]
    fn test_rectangle_from_json() {
        let mut shape = object(json!({
            "type": "rectangle", "X": 10, "Y": 20, "Width": 30, "Height": 40,
            "StrokeColor": -1
        }));
        let feature = try_feature_factory(&mut shape, &TextMetrics::default()).expect("feature");
        let rect = feature.geometry.as_rectangle().expect("rectangle");
        assert_eq!(rect.upper_left_corner(), [10.0, -20.0]);
        assert_eq!(feature.id, UNASSIGNED_ID);
        assert!(feature.style.stroke.is_some());
    }

    #[test]
    fn test_line_markers_and_transform() {
        let mut shape = object(json!({
            "type": "line", "X1": 0, "Y1": 0, "X2": 10, "Y2": 10,
            "MarkerEnd": "Arrow",
            "Transform": {
                "@type": "http://www.openmicroscopy.org/Schemas/OME/2016-06#AffineTransform",
                "A00": 1, "A10": 0, "A01": 0, "A11": 1, "A02": 5, "A12": 0
            }
        }));
        let feature = try_feature_factory(&mut shape, &TextMetrics::default()).expect("feature");
        let line = feature.geometry.as_line().expect("line");
        assert!(!line.has_start_arrow && line.has_end_arrow);
        assert_eq!(line.coordinates()[1], [15.0, -10.0]);
        // no style in the json, lines get a default stroke
        assert_eq!(shape["StrokeColor"], -1);
    }

    #[test]
    fn test_label_is_sized_from_text() {
        let mut shape = object(json!({"type": "label", "X": 0, "Y": 0, "Text": "abcd"}));
        let metrics = TextMetrics {
            resolution: 1.0,
            char_width_ratio: 0.5,
        };
        let feature = try_feature_factory(&mut shape, &metrics).expect("feature");
        let label = feature.geometry.as_label().expect("label");
        assert_eq!((label.width(), label.height()), (20.0, 10.0));
        assert_eq!(shape["FontFamily"], DEFAULT_FONT_FAMILY);
        assert_eq!(feature.style.text.text, "abcd");
    }

    #[test]
    fn test_failures() {
        let metrics = TextMetrics::default();
        let mut missing = object(json!({"type": "ellipse", "X": 1, "Y": 1, "RadiusX": 2}));
        assert!(matches!(
            try_feature_factory(&mut missing, &metrics),
            Err(ConversionError::MissingField { .. })
        ));
        let mut unknown = object(json!({"type": "circle"}));
        assert!(matches!(
            try_feature_factory(&mut unknown, &metrics),
            Err(ConversionError::UnknownShapeType { .. })
        ));
        let mut bad_points = object(json!({"type": "polygon", "Points": "1,1 2"}));
        assert!(feature_factory(&mut bad_points, &metrics).is_none());
    }
}
