//! HTTP API layer: routing, handlers, middleware and response DTOs.
//!
//! Request bodies are defined in [`crate::models`]; everything else the
//! HTTP boundary needs lives here.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
