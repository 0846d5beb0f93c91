//! # RoiKit Regions
//!
//! Region-of-interest shapes for multi-dimensional image viewers: the
//! geometry model, its wire JSON form and the collection that tracks every
//! shape of an image through editing and persistence.
//!
//! ## Core Components
//!
//! - **Transform**: 2D affine matrices in the server's 6-element layout
//! - **Model**: Point, line/polyline, polygon, rectangle, ellipse, label and mask
//! - **Style**: Fill, stroke and font of a shape
//! - **Conversion**: Colors, shape JSON in both directions and store batches
//! - **Regions**: Lifecycle state machine, plane filtering, undo/redo,
//!   loading and store reconciliation
//!
//! ## Architecture
//!
//! ```text
//! RegionCollection (one image)
//!   ├── Feature (geometry + state + plane attachment + permissions + style)
//!   ├── ViewState (selection, visibility)
//!   ├── History (pending/closed entries)
//!   └── EventBus (property, history, persistence notifications)
//!
//! RegionsSession
//!   ├── RegionCollection (behind a mutex)
//!   └── RegionsBackend (persist and fetch over an async boundary)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roikit_regions::{RegionCollection, RegionsOptions};
//! use roikit_core::PlanePosition;
//!
//! let mut regions = RegionCollection::new(42, PlanePosition::new(0, 0, vec![0]), RegionsOptions::default());
//! regions.load_regions(rois);
//! regions.translate_features(&regions.selected_ids(), 10.0, 0.0);
//! let batch = regions.prepare_store(None);
//! ```

pub mod conversion;
pub mod feature;
pub mod model;
pub mod regions;
pub mod style;
pub mod transform;

pub use conversion::{
    feature_factory, feature_to_json_object, to_json_object, Color, JsonObject, RoisBatch,
    TextMetrics,
};
pub use feature::{Feature, ViewState, UNATTACHED};
pub use model::{
    Coord, Ellipse, Extent, Geometry, Label, Line, Mask, Point, Polygon, Rectangle, RegionShape,
    ShapeKind,
};
pub use regions::{
    calculate_length_and_area, create_features_from_regions_response, feature_renders,
    generate_regions, EntryStatus, HistoryEntry, HistoryRecord, Measurement, PropertyChange,
    RegionCollection, RegionsOptions, RegionsSession, StoreOutcome,
};
pub use style::{FontSpec, ShapeStyle};
pub use transform::{AffineTransform, Matrix};
