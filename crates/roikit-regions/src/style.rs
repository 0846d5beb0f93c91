//! Shape styles.
//!
//! A [`ShapeStyle`] is the persisted look of a shape: fill, stroke and text.
//! Selection highlighting never touches it, so serialization always sees the
//! colors the user chose.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conversion::color::Color;
use crate::model::ShapeKind;

pub const DEFAULT_FONT_STYLE: &str = "normal";
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
/// Packed white, the stroke used when a shape comes without any style.
pub const DEFAULT_STROKE_COLOR: i32 = -1;
/// Average glyph width relative to the font size.
pub const DEFAULT_CHAR_WIDTH_RATIO: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub style: String,
    /// Size in pixels
    pub size: f64,
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: DEFAULT_FONT_STYLE.to_string(),
            size: DEFAULT_FONT_SIZE,
            family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

impl FontSpec {
    /// `"<style> <size>px <family>"`
    pub fn to_css(&self) -> String {
        format!("{} {}px {}", self.style, self.size, self.family)
    }

    /// Parses a css font string. Families may contain spaces.
    pub fn parse(font: &str) -> Option<Self> {
        let mut tokens = font.split_whitespace();
        let style = tokens.next()?;
        let size = tokens.next()?.trim_end_matches("px").parse::<f64>().ok()?;
        let family = tokens.collect::<Vec<_>>().join(" ");
        if family.is_empty() || !size.is_finite() {
            return None;
        }
        Some(Self {
            style: style.to_string(),
            size,
            family,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStyle {
    pub text: String,
    pub font: FontSpec,
    /// Text color; follows the stroke, or the fill for labels without stroke
    pub fill: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
    pub text: TextStyle,
}

impl ShapeStyle {
    /// Plain outline style for shapes created without style information.
    pub fn outline() -> Self {
        let color = Color::from_signed_integer(DEFAULT_STROKE_COLOR);
        Self {
            fill: None,
            stroke: Some(StrokeStyle {
                color,
                width: DEFAULT_STROKE_WIDTH,
            }),
            text: TextStyle {
                fill: Some(color),
                ..TextStyle::default()
            },
        }
    }
}

fn number(shape_info: &Map<String, Value>, key: &str) -> Option<f64> {
    shape_info.get(key).and_then(Value::as_f64)
}

fn length_value(shape_info: &Map<String, Value>, key: &str) -> Option<f64> {
    shape_info.get(key)?.get("Value")?.as_f64()
}

fn packed_color(shape_info: &Map<String, Value>, key: &str) -> Option<Color> {
    let value = shape_info.get(key)?.as_i64()?;
    i32::try_from(value)
        .or_else(|_| u32::try_from(value).map(|v| v as i32))
        .ok()
        .map(Color::from_signed_integer)
}

/// Builds the style of a shape from its wire fields.
pub fn create_feature_style(shape_info: &Map<String, Value>, is_label: bool) -> ShapeStyle {
    let fill = packed_color(shape_info, "FillColor");
    let stroke_color = packed_color(shape_info, "StrokeColor");
    let stroke_width = length_value(shape_info, "StrokeWidth");

    let stroke = match (stroke_color, stroke_width) {
        (Some(color), width) => Some(StrokeStyle {
            color,
            width: width.unwrap_or(DEFAULT_STROKE_WIDTH),
        }),
        // a width alone still yields a stroke, drawn in the default color
        (None, Some(width)) => Some(StrokeStyle {
            color: Color::from_signed_integer(DEFAULT_STROKE_COLOR),
            width,
        }),
        (None, None) => None,
    };

    let text = shape_info
        .get("Text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let font = FontSpec {
        style: shape_info
            .get("FontStyle")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FONT_STYLE)
            .to_string(),
        size: length_value(shape_info, "FontSize").unwrap_or(DEFAULT_FONT_SIZE),
        family: shape_info
            .get("FontFamily")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string(),
    };
    let text_fill = match (&stroke, is_label) {
        (Some(stroke), _) if stroke_color.is_some() => Some(stroke.color),
        (_, true) => fill,
        _ => None,
    };

    ShapeStyle {
        fill,
        stroke,
        text: TextStyle {
            text,
            font,
            fill: text_fill,
        },
    }
}

/// Gives unstyled shapes (and lines without stroke) a visible outline.
pub fn remedy_style_if_necessary(shape_info: &mut Map<String, Value>, kind: ShapeKind) {
    let has_stroke = number(shape_info, "StrokeColor").is_some();
    let has_fill = number(shape_info, "FillColor").is_some();
    if (has_fill || has_stroke) && (has_stroke || !kind.is_line_like()) {
        return;
    }
    shape_info.insert("StrokeColor".to_string(), Value::from(DEFAULT_STROKE_COLOR));
    if length_value(shape_info, "StrokeWidth").is_none() {
        shape_info.insert(
            "StrokeWidth".to_string(),
            serde_json::json!({ "Value": DEFAULT_STROKE_WIDTH }),
        );
    }
}

/// Fills in geometry fields missing from generated shape definitions.
pub fn remedy_shape_info_if_necessary(shape_info: &mut Map<String, Value>, kind: ShapeKind) {
    fn default_number(info: &mut Map<String, Value>, key: &str, value: f64) {
        if info.get(key).and_then(Value::as_f64).is_none() {
            info.insert(key.to_string(), Value::from(value));
        }
    }
    fn default_string(info: &mut Map<String, Value>, key: &str, value: &str) {
        if !info.get(key).is_some_and(Value::is_string) {
            info.insert(key.to_string(), Value::from(value));
        }
    }

    match kind {
        ShapeKind::Point => {
            default_number(shape_info, "X", 6.0);
            default_number(shape_info, "Y", 6.0);
        }
        ShapeKind::Line => {
            default_number(shape_info, "X1", 2.0);
            default_number(shape_info, "X2", 17.0);
            default_number(shape_info, "Y1", 2.0);
            default_number(shape_info, "Y2", 2.0);
        }
        ShapeKind::Polyline => default_string(shape_info, "Points", "2,2 7,7 12,2 17,7"),
        ShapeKind::Polygon => default_string(shape_info, "Points", "2,2 7,7 12,2 17,7 2,2"),
        ShapeKind::Rectangle => {
            default_number(shape_info, "X", 2.0);
            default_number(shape_info, "Y", 2.0);
            default_number(shape_info, "Width", 15.0);
            default_number(shape_info, "Height", 15.0);
        }
        ShapeKind::Ellipse => {
            default_number(shape_info, "X", 20.0);
            default_number(shape_info, "Y", 15.0);
            default_number(shape_info, "RadiusX", 8.0);
            default_number(shape_info, "RadiusY", 5.0);
        }
        ShapeKind::Label => {
            default_string(shape_info, "FontFamily", DEFAULT_FONT_FAMILY);
            if length_value(shape_info, "FontSize").is_none() {
                shape_info.insert("FontSize".to_string(), serde_json::json!({ "Value": 15 }));
            }
            default_string(shape_info, "FontStyle", DEFAULT_FONT_STYLE);
            default_string(shape_info, "Text", "generated");
            default_number(shape_info, "X", 10.0);
            default_number(shape_info, "Y", 10.0);
        }
        ShapeKind::Mask => {}
    }
}

/// Estimated pixel size of a text.
///
/// There is no font rasterizer here, so the width is the character count
/// times the scaled font size times `char_width_ratio`. An empty text is 5
/// wide. The height is the scaled font size rounded up.
pub fn measure_text_dimensions(
    text: &str,
    font: &FontSpec,
    resolution: f64,
    char_width_ratio: f64,
) -> (f64, f64) {
    let resolution = if resolution > 0.0 { resolution } else { 1.0 };
    let size = (font.size.trunc() * resolution).ceil();
    let width = text.chars().count() as f64 * size * char_width_ratio;
    (if width > 0.0 { width } else { 5.0 }, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_font_css_round_trip() {
        let font = FontSpec::parse("italic 12px Times New Roman").expect("valid font");
        assert_eq!(font.size, 12.0);
        assert_eq!(font.family, "Times New Roman");
        assert_eq!(font.to_css(), "italic 12px Times New Roman");
        assert!(FontSpec::parse("bold").is_none());
        assert_eq!(FontSpec::default().to_css(), "normal 10px sans-serif");
    }

    #[test]
    fn test_style_from_wire_fields() {
        let style = create_feature_style(
            &info(json!({
                "FillColor": -256,
                "StrokeColor": 65535,
                "StrokeWidth": {"Value": 3},
                "Text": "hello",
                "FontSize": {"Value": 14}
            })),
            false,
        );
        assert_eq!(style.fill, Some(Color::new(255, 255, 255, 0.0)));
        let stroke = style.stroke.expect("stroke");
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.color, Color::new(0, 0, 255, 1.0));
        assert_eq!(style.text.text, "hello");
        assert_eq!(style.text.fill, Some(stroke.color));
        assert_eq!(style.text.font.to_css(), "normal 14px sans-serif");
    }

    #[test]
    fn test_label_text_takes_fill_without_stroke() {
        let style = create_feature_style(&info(json!({"FillColor": 255})), true);
        assert_eq!(style.text.fill, Some(Color::new(0, 0, 0, 1.0)));
        let style = create_feature_style(&info(json!({"FillColor": 255})), false);
        assert_eq!(style.text.fill, None);
    }

    #[test]
    fn test_remedy_style() {
        let mut bare = info(json!({}));
        remedy_style_if_necessary(&mut bare, ShapeKind::Rectangle);
        assert_eq!(bare["StrokeColor"], -1);
        assert_eq!(bare["StrokeWidth"]["Value"], 1.0);

        let mut filled_line = info(json!({"FillColor": 10, "StrokeWidth": {"Value": 4}}));
        remedy_style_if_necessary(&mut filled_line, ShapeKind::Line);
        assert_eq!(filled_line["StrokeColor"], -1);
        assert_eq!(filled_line["StrokeWidth"]["Value"], 4);

        let mut filled_rect = info(json!({"FillColor": 10}));
        remedy_style_if_necessary(&mut filled_rect, ShapeKind::Rectangle);
        assert!(filled_rect.get("StrokeColor").is_none());
    }

    #[test]
    fn test_remedy_shape_info() {
        let mut ellipse = info(json!({"X": 1}));
        remedy_shape_info_if_necessary(&mut ellipse, ShapeKind::Ellipse);
        assert_eq!(ellipse["X"], 1);
        assert_eq!(ellipse["RadiusY"], 5.0);

        let mut label = info(json!({}));
        remedy_shape_info_if_necessary(&mut label, ShapeKind::Label);
        assert_eq!(label["Text"], "generated");
        assert_eq!(label["FontSize"]["Value"], 15);
    }

    #[test]
    fn test_measure_text() {
        let font = FontSpec::default();
        assert_eq!(measure_text_dimensions("abcd", &font, 1.0, 0.5), (20.0, 10.0));
        assert_eq!(measure_text_dimensions("", &font, 1.0, 0.5), (5.0, 10.0));
        assert_eq!(measure_text_dimensions("ab", &font, 1.25, 0.5), (13.0, 13.0));
    }
}
