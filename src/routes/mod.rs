//! HTTP route handlers.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive the
//! OpenAPI document served next to them.

pub mod health;
pub mod params;
pub mod search;
