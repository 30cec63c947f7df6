//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use foodgram_common::Config;
use foodgram_core::{
    FavoriteService, IngredientService, LedgerService, RecipeService, ShoppingCartService,
    ShoppingListService, SubscriptionService, TagService, UserService,
};
use foodgram_db::repositories::{
    FavoriteRepository, IngredientRepository, LedgerRepository, RecipeRepository,
    ShoppingCartRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub tag_service: TagService,
    pub ingredient_service: IngredientService,
    pub ledger_service: LedgerService,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub shopping_cart_service: ShoppingCartService,
    pub shopping_list_service: ShoppingListService,
    pub subscription_service: SubscriptionService,
}

impl AppState {
    /// Wire repositories and services on top of a database connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let ingredient_repo = IngredientRepository::new(Arc::clone(&db));
        let recipe_repo = RecipeRepository::new(Arc::clone(&db));
        let ledger_repo = LedgerRepository::new(Arc::clone(&db));
        let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
        let cart_repo = ShoppingCartRepository::new(Arc::clone(&db));
        let subscription_repo = SubscriptionRepository::new(db);

        let ledger_service = LedgerService::new(
            ledger_repo.clone(),
            recipe_repo.clone(),
            ingredient_repo.clone(),
            config.recipes,
        );
        let recipe_service = RecipeService::new(
            recipe_repo.clone(),
            ledger_service.clone(),
            tag_repo.clone(),
            user_repo.clone(),
            favorite_repo.clone(),
            cart_repo.clone(),
            config.recipes,
            config.server.url.clone(),
        );

        Self {
            user_service: UserService::new(user_repo.clone()),
            tag_service: TagService::new(tag_repo),
            ingredient_service: IngredientService::new(ingredient_repo),
            ledger_service,
            recipe_service,
            favorite_service: FavoriteService::new(favorite_repo, recipe_repo.clone()),
            shopping_cart_service: ShoppingCartService::new(cart_repo.clone(), recipe_repo),
            shopping_list_service: ShoppingListService::new(cart_repo, ledger_repo),
            subscription_service: SubscriptionService::new(subscription_repo, user_repo),
        }
    }
}

/// Authentication middleware.
///
/// Accepts `Authorization: Token <token>` and `Authorization: Bearer <token>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str
            .strip_prefix("Token ")
            .or_else(|| auth_str.strip_prefix("Bearer "))
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown API token"),
            Err(e) => tracing::warn!(error = %e, "Token lookup failed"),
        }
    }

    next.run(req).await
}
