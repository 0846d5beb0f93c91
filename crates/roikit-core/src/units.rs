//! Length unit utilities
//!
//! Physical pixel sizes arrive with a unit symbol. Measurements are reported
//! in microns, so every other unit carries a multiplier relative to the micron.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbol used when the pixel size has no physical unit.
pub const PIXEL_SYMBOL: &str = "px";

/// Physical length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Angstrom,
    Nanometer,
    Micron,
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Micron
    }
}

impl LengthUnit {
    /// All units, smallest first.
    pub const ALL: [LengthUnit; 7] = [
        Self::Angstrom,
        Self::Nanometer,
        Self::Micron,
        Self::Millimeter,
        Self::Centimeter,
        Self::Meter,
        Self::Kilometer,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Angstrom => "\u{212B}",
            Self::Nanometer => "nm",
            Self::Micron => "\u{00B5}m",
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::Kilometer => "km",
        }
    }

    /// Factor converting a value in microns into this unit.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Angstrom => 10000.0,
            Self::Nanometer => 1000.0,
            Self::Micron => 1.0,
            Self::Millimeter => 0.001,
            Self::Centimeter => 0.0001,
            Self::Meter => 0.000001,
            Self::Kilometer => 0.000000001,
        }
    }

    /// Upper bound (in microns) below which this unit reads naturally.
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Angstrom => 0.01,
            Self::Nanometer => 1.0,
            Self::Micron => 1000.0,
            Self::Millimeter => 100000.0,
            Self::Centimeter => 1000000.0,
            Self::Meter => 1000000000.0,
            Self::Kilometer => f64::INFINITY,
        }
    }

    /// Looks a unit up by its display symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.symbol() == symbol)
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(unit) = Self::from_symbol(s) {
            return Ok(unit);
        }
        match s.to_lowercase().as_str() {
            "angstrom" => Ok(Self::Angstrom),
            "nanometer" | "nm" => Ok(Self::Nanometer),
            "micron" | "micrometer" | "um" => Ok(Self::Micron),
            "millimeter" | "mm" => Ok(Self::Millimeter),
            "centimeter" | "cm" => Ok(Self::Centimeter),
            "meter" | "m" => Ok(Self::Meter),
            "kilometer" | "km" => Ok(Self::Kilometer),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Scale factor for a pixel size given in `symbol`.
///
/// Microns and unknown symbols (including plain pixels) leave the size as is.
pub fn scaled_pixel_size(pixel_size: f64, symbol: &str) -> f64 {
    if symbol == LengthUnit::Micron.symbol() {
        return pixel_size;
    }
    match LengthUnit::from_symbol(symbol) {
        Some(unit) => pixel_size * unit.multiplier(),
        None => pixel_size,
    }
}

/// Rounds to three decimals. Negative values mark "not applicable" and pass through.
pub fn round_three_decimals(value: f64) -> f64 {
    if value < 0.0 {
        return value;
    }
    (value * 1000.0).round() / 1000.0
}
