//! API endpoints.

mod ingredients;
mod recipes;
mod short_links;
mod tags;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/tags", tags::router())
        .nest("/ingredients", ingredients::router())
        .nest("/recipes", recipes::router())
}

/// Router for public short links, mounted at the site root.
pub fn short_link_router() -> Router<AppState> {
    short_links::router()
}
