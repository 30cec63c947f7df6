//! Shopping cart service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{recipe, shopping_cart},
    repositories::{RecipeRepository, ShoppingCartRepository},
};
use sea_orm::Set;

/// Shopping cart service for business logic.
#[derive(Clone)]
pub struct ShoppingCartService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl ShoppingCartService {
    /// Create a new shopping cart service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Put a recipe into a user's cart.
    pub async fn add(&self, user_id: &str, recipe_id: &str) -> AppResult<recipe::Model> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        let model = shopping_cart::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            recipe_id: Set(recipe_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        if !self.cart_repo.insert_if_absent(model).await? {
            return Err(AppError::BadRequest(
                "Recipe is already in the shopping cart".to_string(),
            ));
        }

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Added recipe to cart");
        Ok(recipe)
    }

    /// Take a recipe out of a user's cart.
    pub async fn remove(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        if !self
            .cart_repo
            .delete_by_user_and_recipe(user_id, recipe_id)
            .await?
        {
            return Err(AppError::BadRequest(
                "Recipe is not in the shopping cart".to_string(),
            ));
        }

        tracing::info!(user_id = %user_id, recipe_id = %recipe_id, "Removed recipe from cart");
        Ok(())
    }

    /// Check whether a recipe is in a user's cart.
    pub async fn contains(&self, user_id: &str, recipe_id: &str) -> AppResult<bool> {
        self.cart_repo.is_in_cart(user_id, recipe_id).await
    }

    /// IDs of the recipes in a user's cart.
    pub async fn recipe_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.cart_repo.find_cart_recipe_ids(user_id).await
    }
}
