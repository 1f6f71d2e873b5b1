//! HTTP API layer for quill.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: posts, groups, users, auth and admin routes
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: auth resolution, shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
