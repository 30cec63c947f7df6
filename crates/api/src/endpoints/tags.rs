//! Tag endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use foodgram_common::AppResult;
use foodgram_db::entities::tag;

use crate::{middleware::AppState, response::ApiResponse};

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<tag::Model>>> {
    let tags = state.tag_service.list().await?;
    Ok(ApiResponse::ok(tags))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<tag::Model>> {
    let tag = state.tag_service.get(&id).await?;
    Ok(ApiResponse::ok(tag))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
}
