//! HTTP API layer for Foodgram.
//!
//! - **Endpoints**: users, tags, ingredients, recipes and the shopping list download
//! - **Extractors**: authenticated and optional user
//! - **Middleware**: token authentication and shared application state
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{router, short_link_router};
pub use middleware::AppState;
