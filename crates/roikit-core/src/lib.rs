//! # RoiKit Core
//!
//! Core types, traits, and utilities for RoiKit.
//! Provides the shared vocabulary of the regions subsystem: shape ids and
//! lifecycle states, image dimensions, length units, errors, events and
//! the persistence backend interface.

pub mod backend;
pub mod dimensions;
pub mod error;
pub mod event_bus;
pub mod region;
pub mod units;

pub use backend::{PersistRequest, PersistResponse, RegionsBackend};

pub use dimensions::{Dimension, ImageExtent, PlanePosition, Projection, ZRange};

pub use error::{ConversionError, Error, GeometryError, PersistenceError, Result};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, AppEvent, ChangedProperty, EventBus, EventBusConfig, EventCategory, EventFilter,
    HistoryEvent, ListenerId, PersistenceEvent, PropertyEvent, RegionsEvent,
};

pub use region::{Permissions, RegionState, ShapeId};

pub use units::{round_three_decimals, scaled_pixel_size, LengthUnit, PIXEL_SYMBOL};
