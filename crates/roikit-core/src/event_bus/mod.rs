//! # Event Bus Module
//!
//! Publish/subscribe hub that carries region notifications (property
//! changes, store results, history entries) to the host application.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roikit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let listener = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Property]),
//!     |event| {
//!         if let AppEvent::Property(change) = event {
//!             println!("{:?}", change);
//!         }
//!     },
//! );
//! bus.unsubscribe(listener);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
