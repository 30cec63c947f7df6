//! Shopping cart repository.

use std::sync::Arc;

use crate::entities::{ShoppingCart, shopping_cart};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::OnConflict,
};

/// Shopping cart repository for database operations.
#[derive(Clone)]
pub struct ShoppingCartRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoppingCartRepository {
    /// Create a new shopping cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a recipe is in a user's cart.
    pub async fn is_in_cart(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let count = ShoppingCart::find()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Get the IDs of all recipes in a user's cart.
    ///
    /// Each recipe appears at most once.
    pub async fn find_cart_recipe_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        ShoppingCart::find()
            .select_only()
            .column(shopping_cart::Column::RecipeId)
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of the given recipes, return the IDs in the user's cart.
    pub async fn find_in_cart_among(
        &self,
        user_id: &str,
        recipe_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        ShoppingCart::find()
            .select_only()
            .column(shopping_cart::Column::RecipeId)
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add a recipe to a cart unless it is already there.
    ///
    /// Returns whether a row was inserted.
    pub async fn insert_if_absent(&self, model: shopping_cart::ActiveModel) -> AppResult<bool> {
        let inserted = ShoppingCart::insert(model)
            .on_conflict(
                OnConflict::columns([
                    shopping_cart::Column::UserId,
                    shopping_cart::Column::RecipeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Remove a recipe from a cart. Returns whether a row was deleted.
    pub async fn delete_by_user_and_recipe(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        let result = ShoppingCart::delete_many()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set, Value};

    #[tokio::test]
    async fn test_find_cart_recipe_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! { "recipe_id" => Value::from("recipeA") },
                    btreemap! { "recipe_id" => Value::from("recipeB") },
                ]])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        let ids = repo.find_cart_recipe_ids("user1").await.unwrap();

        assert_eq!(ids, vec!["recipeA".to_string(), "recipeB".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        let ids = repo.find_cart_recipe_ids("user1").await.unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_is_in_cart_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(0)),
                }]])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        assert!(!repo.is_in_cart("user1", "recipe1").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_if_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ShoppingCartRepository::new(db);
        let model = shopping_cart::ActiveModel {
            id: Set("cart1".to_string()),
            user_id: Set("user1".to_string()),
            recipe_id: Set("recipe1".to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        assert!(repo.insert_if_absent(model).await.unwrap());
    }
}
