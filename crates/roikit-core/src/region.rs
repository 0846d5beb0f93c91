//! Region identity, lifecycle state and permissions.
//!
//! Shape ids are kept as a small value type instead of `"roi:shape"` strings.
//! Negative roi or shape ids denote entities that were created locally and
//! have not been acknowledged by the server yet.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// Combined roi/shape identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId {
    pub roi_id: i64,
    pub shape_id: i64,
}

impl ShapeId {
    pub fn new(roi_id: i64, shape_id: i64) -> Self {
        Self { roi_id, shape_id }
    }

    /// True if either part lies in the reserved negative range.
    pub fn is_unsaved(&self) -> bool {
        self.roi_id < 0 || self.shape_id < 0
    }

    /// True if both parts are positive, i.e. the shape exists server-side.
    pub fn is_persisted(&self) -> bool {
        self.roi_id > 0 && self.shape_id > 0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.roi_id, self.shape_id)
    }
}

impl FromStr for ShapeId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConversionError::InvalidShapeId {
            value: s.to_string(),
        };
        let (roi, shape) = s.trim().split_once(':').ok_or_else(invalid)?;
        let roi_id = roi.trim().parse::<i64>().map_err(|_| invalid())?;
        let shape_id = shape.trim().parse::<i64>().map_err(|_| invalid())?;
        Ok(Self { roi_id, shape_id })
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a shape feature
///
/// `Rollback` is an instruction, never a steady state: applying it restores
/// whatever state was remembered before the last delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegionState {
    /// Unchanged since it was last persisted
    #[default]
    Default,
    /// Geometry or style changed
    Modified,
    /// Created locally
    Added,
    /// Flagged for deletion
    Removed,
    /// Restore the remembered pre-deletion state
    Rollback,
}

impl RegionState {
    /// Numeric code used by the host application.
    pub fn code(&self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Modified => 1,
            Self::Added => 2,
            Self::Removed => 3,
            Self::Rollback => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Default),
            1 => Some(Self::Modified),
            2 => Some(Self::Added),
            3 => Some(Self::Removed),
            4 => Some(Self::Rollback),
            _ => None,
        }
    }
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "DEFAULT"),
            Self::Modified => write!(f, "MODIFIED"),
            Self::Added => write!(f, "ADDED"),
            Self::Removed => write!(f, "REMOVED"),
            Self::Rollback => write!(f, "ROLLBACK"),
        }
    }
}

/// Per-shape permissions as delivered with the shape details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default = "granted")]
    pub can_edit: bool,
    #[serde(default = "granted")]
    pub can_delete: bool,
    #[serde(default = "granted")]
    pub can_annotate: bool,
}

fn granted() -> bool {
    true
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}

impl Permissions {
    /// Everything allowed, used for shapes the local user just created.
    pub fn all() -> Self {
        Self {
            can_edit: true,
            can_delete: true,
            can_annotate: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            can_edit: false,
            can_delete: false,
            can_annotate: false,
        }
    }
}
