#[path = "core/errors.rs"]
mod errors;
#[path = "core/events.rs"]
mod events;
