//! Shape features.
//!
//! A [`Feature`] holds everything about a shape that gets persisted. Transient
//! UI flags live in [`ViewState`], owned by the collection and joined by id,
//! so serialization never sees them.

use roikit_core::{Permissions, RegionState, ShapeId};

use crate::model::{Geometry, RegionShape, ShapeKind};
use crate::style::ShapeStyle;

/// Plane index meaning "attached to all planes of that dimension".
pub const UNATTACHED: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: ShapeId,
    pub geometry: Geometry,
    pub state: RegionState,
    /// State before the latest delete, restored by a rollback
    pub old_state: Option<RegionState>,
    pub the_z: i32,
    pub the_t: i32,
    pub the_c: i32,
    pub permissions: Permissions,
    pub style: ShapeStyle,
    /// Cached area, `-1` when not applicable, `None` until measured
    pub area: Option<f64>,
    /// Cached length, `-1` when not applicable, `None` until measured
    pub length: Option<f64>,
}

impl Feature {
    /// Unattached, unmeasured feature in state DEFAULT with full permissions.
    pub fn new(id: ShapeId, geometry: Geometry) -> Self {
        Self {
            id,
            geometry,
            state: RegionState::Default,
            old_state: None,
            the_z: UNATTACHED,
            the_t: UNATTACHED,
            the_c: UNATTACHED,
            permissions: Permissions::all(),
            style: ShapeStyle::outline(),
            area: None,
            length: None,
        }
    }

    pub fn with_state(mut self, state: RegionState) -> Self {
        self.state = state;
        self
    }

    pub fn with_planes(mut self, the_z: i32, the_t: i32, the_c: i32) -> Self {
        self.the_z = the_z;
        self.the_t = the_t;
        self.the_c = the_c;
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn is_deleted(&self) -> bool {
        self.state == RegionState::Removed
    }

    pub fn is_label(&self) -> bool {
        self.kind() == ShapeKind::Label
    }
}

/// Transient display flags of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub selected: bool,
    pub visible: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected: false,
            visible: true,
        }
    }
}
