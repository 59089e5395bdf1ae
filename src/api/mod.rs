//! API layer - HTTP handlers and middleware
//!
//! - Request handlers
//! - Bearer token middleware
//! - Validated JSON extractor
//! - Route definitions and OpenAPI document

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
