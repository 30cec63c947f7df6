//! Public short links.

use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use foodgram_common::AppResult;

use crate::middleware::AppState;

/// Redirect `/s/{code}` to the recipe page.
async fn resolve(State(state): State<AppState>, Path(code): Path<String>) -> AppResult<Redirect> {
    let recipe = state.recipe_service.resolve_short_code(&code).await?;
    Ok(Redirect::temporary(&format!("/recipes/{}", recipe.id)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/s/{code}", get(resolve))
}
