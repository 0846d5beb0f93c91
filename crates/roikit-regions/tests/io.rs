#[path = "io/session.rs"]
mod session;
