//! Color conversions
//!
//! The wire format packs colors into a signed 32-bit integer
//! `(R << 24) | (G << 16) | (B << 8) | A` with alpha scaled to 0..=255.
//! Styles work with [`Color`] values, which can also be read from css-like
//! `rgba(...)`/`rgb(...)` strings, `#rgb`/`#rrggbb` hex strings and
//! channel arrays.

use regex::Regex;
use roikit_core::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity in `0.0..=1.0`
    pub alpha: f64,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 1.0);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Decodes a packed RGBA integer. Negative values are read as unsigned bits.
    pub fn from_signed_integer(value: i32) -> Self {
        let [red, green, blue, alpha] = (value as u32).to_be_bytes();
        Self {
            red,
            green,
            blue,
            alpha: alpha as f64 / 255.0,
        }
    }

    /// Packs the color, rounding the scaled alpha half-up.
    pub fn to_signed_integer(&self) -> i32 {
        let alpha = (self.alpha * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8;
        i32::from_be_bytes([self.red, self.green, self.blue, alpha])
    }

    /// `rgba(r,g,b,a)`
    pub fn to_rgba(&self) -> String {
        format!("rgba({},{},{},{})", self.red, self.green, self.blue, self.alpha)
    }

    /// `#rrggbb`, alpha is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgba())
    }
}

impl FromStr for Color {
    type Err = ConversionError;

    /// Accepts rgba/rgb notation and hex notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = if s.contains("rgb") {
            convert_rgba_color_format_to_object(s, None)
        } else {
            convert_hex_color_format_to_object(s, None)
        };
        parsed.ok_or_else(|| ConversionError::InvalidColor {
            value: s.to_string(),
        })
    }
}

/// Validates channels (0..=255) and alpha (0..=1, default 1).
pub fn check_color_object_correctness(
    red: f64,
    green: f64,
    blue: f64,
    alpha: Option<f64>,
) -> Option<Color> {
    let channel = |v: f64| {
        if v.is_finite() && (0.0..=255.0).contains(&v) {
            Some(v as u8)
        } else {
            None
        }
    };
    let alpha = alpha.unwrap_or(1.0);
    if !(0.0..=1.0).contains(&alpha) {
        tracing::warn!(alpha, "Alpha values need to range in between 0 and 1");
        return None;
    }
    Some(Color::new(channel(red)?, channel(green)?, channel(blue)?, alpha))
}

/// Parses `rgba(r,g,b,a)` or `rgb(r,g,b)`.
///
/// `alpha` is used when the string carries none.
pub fn convert_rgba_color_format_to_object(rgba: &str, alpha: Option<f64>) -> Option<Color> {
    static RGBA_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RGBA_REGEX.get_or_init(|| {
        Regex::new(r"^\s*rgba?\(\s*([^,)]+),\s*([^,)]+),\s*([^,)]+)(?:,\s*([^,)]+))?\)\s*$").ok()
    });
    let caps = re.as_ref()?.captures(rgba)?;
    let channel = |i: usize| caps[i].trim().parse::<i64>().ok().map(|v| v as f64);
    let alpha = match caps.get(4) {
        Some(a) => Some(a.as_str().trim().parse::<f64>().ok()?),
        None => alpha,
    };
    let color = check_color_object_correctness(channel(1)?, channel(2)?, channel(3)?, alpha);
    if color.is_none() {
        tracing::warn!(rgba, "RGB values need to range in between 0 and 255");
    }
    color
}

/// Parses `#rgb` or `#rrggbb`, whitespace is ignored.
pub fn convert_hex_color_format_to_object(hex: &str, alpha: Option<f64>) -> Option<Color> {
    let mut digits: String = hex
        .chars()
        .filter(|c| *c != '#' && !c.is_whitespace())
        .collect();
    if digits.len() == 3 {
        digits = digits.chars().flat_map(|c| [c, c]).collect();
    }
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    check_color_object_correctness(
        channel(0..2)? as f64,
        channel(2..4)? as f64,
        channel(4..6)? as f64,
        alpha,
    )
}

/// Builds a color from `[r, g, b]` or `[r, g, b, a]`.
pub fn convert_color_array_to_object(rgba: &[f64], alpha: Option<f64>) -> Option<Color> {
    match rgba {
        [r, g, b] => check_color_object_correctness(*r, *g, *b, alpha),
        [r, g, b, a, ..] => check_color_object_correctness(*r, *g, *b, Some(*a)),
        _ => None,
    }
}

/// Packs a color given in rgba or hex notation.
pub fn convert_color_to_signed_integer(color: &str, alpha: Option<f64>) -> Result<i32, ConversionError> {
    let parsed = if color.contains("rgba") {
        convert_rgba_color_format_to_object(color, alpha)
    } else {
        convert_hex_color_format_to_object(color, alpha)
    };
    parsed
        .map(|c| c.to_signed_integer())
        .ok_or_else(|| ConversionError::InvalidColor {
            value: color.to_string(),
        })
}
