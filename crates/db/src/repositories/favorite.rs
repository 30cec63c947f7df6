//! Favorite repository.

use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::OnConflict,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a favorite by user and recipe.
    pub async fn find_by_user_and_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
    ) -> AppResult<Option<favorite::Model>> {
        Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has favorited a recipe.
    pub async fn is_favorited(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let count = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Get the IDs of all recipes a user has favorited.
    pub async fn find_recipe_ids_by_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Favorite::find()
            .select_only()
            .column(favorite::Column::RecipeId)
            .filter(favorite::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of the given recipes, return the IDs the user has favorited.
    pub async fn find_favorited_among(
        &self,
        user_id: &str,
        recipe_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        Favorite::find()
            .select_only()
            .column(favorite::Column::RecipeId)
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a favorite unless the user already has that recipe favorited.
    ///
    /// Returns whether a row was inserted.
    pub async fn insert_if_absent(&self, model: favorite::ActiveModel) -> AppResult<bool> {
        let inserted = Favorite::insert(model)
            .on_conflict(
                OnConflict::columns([favorite::Column::UserId, favorite::Column::RecipeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Remove a favorite. Returns whether a row was deleted.
    pub async fn delete_by_user_and_recipe(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
