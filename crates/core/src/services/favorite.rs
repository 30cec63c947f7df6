//! Favorite service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{favorite, recipe},
    repositories::{FavoriteRepository, RecipeRepository},
};
use sea_orm::Set;

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a recipe to a user's favorites.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        let model = favorite::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        if !self.favorite_repo.insert_if_absent(model).await? {
            return Err(AppError::BadRequest(
                "Recipe is already in favorites".to_string(),
            ));
        }

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Added favorite");
        Ok(recipe)
    }

    /// Remove a recipe from a user's favorites.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        if !self
            .favorite_repo
            .delete_by_user_and_recipe(user_id, recipe_id)
            .await?
        {
            return Err(AppError::BadRequest("Recipe is not in favorites".to_string()));
        }

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Removed favorite");
        Ok(())
    }

    /// Check whether a user has favorited a recipe.
    pub async fn contains(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.favorite_repo.is_favorited(user_id, recipe_id).await
    }

    /// IDs of the recipes a user has favorited.
    pub async fn recipe_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.favorite_repo.find_recipe_ids_by_user(user_id).await
    }
}
