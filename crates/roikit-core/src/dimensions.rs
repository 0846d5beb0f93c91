//! Image dimensions.
//!
//! The image extent (width/height in pixels) and the navigable plane
//! position (z, t and the active channels) are distinct types. The extent is
//! fixed per image and never navigated; the plane position changes as the
//! user scrolls through the stack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Navigable dimension of a multi-dimensional image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Z,
    T,
    C,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Z => write!(f, "z"),
            Self::T => write!(f, "t"),
            Self::C => write!(f, "c"),
        }
    }
}

/// Pixel extent of the image (not navigable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageExtent {
    pub width: u32,
    pub height: u32,
}

impl ImageExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bounding box in internal (y-up) coordinates: `[min_x, min_y, max_x, max_y]`.
    pub fn as_bounds(&self) -> [f64; 4] {
        [0.0, -(self.height as f64), self.width as f64, 0.0]
    }
}

/// Inclusive z range of an intensity projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZRange {
    pub start: i32,
    pub end: i32,
}

impl ZRange {
    pub fn contains(&self, z: i32) -> bool {
        z >= self.start && z <= self.end
    }
}

/// Rendering projection of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// A single z plane is shown
    #[default]
    Normal,
    /// Intensity-max projection over a z range; without a range the
    /// current z plane bounds the projection
    IntMax(Option<ZRange>),
}

/// Currently displayed plane and channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlanePosition {
    pub z: i32,
    pub t: i32,
    pub active_channels: Vec<i32>,
    #[serde(default)]
    pub projection: Projection,
}

impl PlanePosition {
    pub fn new(z: i32, t: i32, active_channels: Vec<i32>) -> Self {
        Self {
            z,
            t,
            active_channels,
            projection: Projection::Normal,
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn index(&self, dimension: Dimension) -> Option<i32> {
        match dimension {
            Dimension::Z => Some(self.z),
            Dimension::T => Some(self.t),
            // there are several active channels, no single index
            Dimension::C => None,
        }
    }

    /// Z bounds shapes must fall in to be shown, honouring the projection.
    pub fn z_bounds(&self) -> ZRange {
        match self.projection {
            Projection::IntMax(Some(range)) => range,
            Projection::IntMax(None) | Projection::Normal => ZRange {
                start: self.z,
                end: self.z,
            },
        }
    }

    pub fn is_channel_active(&self, channel: i32) -> bool {
        self.active_channels.contains(&channel)
    }
}
