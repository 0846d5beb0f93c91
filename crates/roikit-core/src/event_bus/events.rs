//! Event type definitions for the event bus.
//!
//! Every notification the regions subsystem sends to its host goes through
//! one of these events. They are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::region::ShapeId;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Property changes on shape features
    Property(PropertyEvent),
    /// Persistence results
    Persistence(PersistenceEvent),
    /// Undo/redo history
    History(HistoryEvent),
    /// Collection-level changes
    Regions(RegionsEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Property(_) => EventCategory::Property,
            AppEvent::Persistence(_) => EventCategory::Persistence,
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Regions(_) => EventCategory::Regions,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Property(e) => e.description(),
            AppEvent::Persistence(e) => e.description(),
            AppEvent::History(e) => e.description(),
            AppEvent::Regions(e) => e.description(),
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for AppEvent {
                fn from(event: $ty) -> Self {
                    AppEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    Property(PropertyEvent),
    Persistence(PersistenceEvent),
    History(HistoryEvent),
    Regions(RegionsEvent),
);

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Property,
    Persistence,
    History,
    Regions,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Property => write!(f, "Property"),
            EventCategory::Persistence => write!(f, "Persistence"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Regions => write!(f, "Regions"),
        }
    }
}

/// Name of a property reported in a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangedProperty {
    Selected,
    Visible,
    /// `true` on delete, `false` on rollback
    Deleted,
    Modified,
}

impl std::fmt::Display for ChangedProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangedProperty::Selected => write!(f, "selected"),
            ChangedProperty::Visible => write!(f, "visible"),
            ChangedProperty::Deleted => write!(f, "deleted"),
            ChangedProperty::Modified => write!(f, "modified"),
        }
    }
}

/// Property change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyEvent {
    /// One batch per `set_property` call; the three vectors run in parallel
    Changed {
        shapes: Vec<ShapeId>,
        properties: Vec<ChangedProperty>,
        values: Vec<bool>,
    },
}

impl PropertyEvent {
    pub fn description(&self) -> String {
        match self {
            PropertyEvent::Changed { shapes, .. } => {
                format!("Properties changed on {} shape(s)", shapes.len())
            }
        }
    }
}

/// Persistence notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// Outcome of a store request
    StoredShapes {
        /// Temporary id to final id
        shapes: BTreeMap<ShapeId, ShapeId>,
        errors: Vec<String>,
        omit_client_update: bool,
    },
}

impl PersistenceEvent {
    pub fn description(&self) -> String {
        match self {
            PersistenceEvent::StoredShapes { shapes, errors, .. } if errors.is_empty() => {
                format!("Stored {} shape(s)", shapes.len())
            }
            PersistenceEvent::StoredShapes { shapes, errors, .. } => format!(
                "Stored {} shape(s) with {} error(s)",
                shapes.len(),
                errors.len()
            ),
        }
    }
}

/// History notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// A completed gesture produced a history entry
    EntryCreated { hist_id: u64, shape_ids: Vec<ShapeId> },
    /// An entry was undone (`undo == true`) or redone
    EntryApplied { hist_id: u64, undo: bool },
}

impl HistoryEvent {
    pub fn description(&self) -> String {
        match self {
            HistoryEvent::EntryCreated { hist_id, shape_ids } => format!(
                "History entry {} created for {} shape(s)",
                hist_id,
                shape_ids.len()
            ),
            HistoryEvent::EntryApplied { hist_id, undo: true } => {
                format!("History entry {} undone", hist_id)
            }
            HistoryEvent::EntryApplied { hist_id, undo: false } => {
                format!("History entry {} redone", hist_id)
            }
        }
    }
}

/// Collection-level notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionsEvent {
    /// Features were (re)built from regions data
    Loaded { feature_count: usize },
    /// Display flags or hover changed and the layer should redraw
    Changed,
}

impl RegionsEvent {
    pub fn description(&self) -> String {
        match self {
            RegionsEvent::Loaded { feature_count } => {
                format!("Loaded {} feature(s)", feature_count)
            }
            RegionsEvent::Changed => "Regions changed".to_string(),
        }
    }
}
