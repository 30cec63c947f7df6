//! Recipe service.

use std::collections::{HashMap, HashSet};

use crate::services::ledger::{LedgerService, RecipeIngredient};
use foodgram_common::{AppError, AppResult, IdGenerator, config::RecipeLimits};
use foodgram_db::{
    entities::{recipe, tag, user},
    repositories::{
        FavoriteRepository, LedgerEntry, RecipeFilter, RecipeRepository, ShoppingCartRepository,
        TagRepository, UserRepository,
    },
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Attempts at drawing an unused short code.
const SHORT_CODE_ATTEMPTS: usize = 5;

/// One ingredient of a recipe request.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountInput {
    /// Ingredient ID.
    pub id: String,
    pub amount: i32,
}

impl From<&IngredientAmountInput> for LedgerEntry {
    fn from(input: &IngredientAmountInput) -> Self {
        Self::new(input.id.clone(), input.amount)
    }
}

/// Input for creating a recipe.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    /// Image reference.
    #[validate(length(min = 1, max = 1024))]
    pub image: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub cooking_time: i32,
    /// Tag IDs.
    #[validate(length(min = 1))]
    pub tags: Vec<String>,
    pub ingredients: Vec<IngredientAmountInput>,
}

/// Input for updating a recipe. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRecipeInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1024))]
    pub image: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    /// Replaces all tags when present.
    #[validate(length(min = 1))]
    pub tags: Option<Vec<String>>,
    /// Replaces the whole ingredient list when present.
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

/// Recipe listing filters as requested by a client.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    pub author_id: Option<String>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// A recipe with its author, tags and ingredients, as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub author: user::Model,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<tag::Model>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: DateTimeWithTimeZone,
}

/// Recipe service for business logic.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ledger: LedgerService,
    tag_repo: TagRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    limits: RecipeLimits,
    server_url: String,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipe_repo: RecipeRepository,
        ledger: LedgerService,
        tag_repo: TagRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        limits: RecipeLimits,
        server_url: String,
    ) -> Self {
        Self {
            recipe_repo,
            ledger,
            tag_repo,
            user_repo,
            favorite_repo,
            cart_repo,
            limits,
            server_url,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a recipe with its tags and ingredients.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateRecipeInput,
    ) -> AppResult<recipe::Model> {
        input.validate()?;
        self.check_cooking_time(input.cooking_time)?;

        let ledger: Vec<LedgerEntry> = input.ingredients.iter().map(LedgerEntry::from).collect();
        self.ledger.check(&ledger).await?;
        self.ensure_tags_exist(&input.tags).await?;

        let short_code = self.unused_short_code().await?;

        let model = recipe::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            name: Set(input.name),
            image: Set(input.image),
            text: Set(input.text),
            cooking_time: Set(input.cooking_time),
            short_code: Set(short_code),
            created_at: Set(chrono::Utc::now().into()),
        };

        let recipe = self
            .recipe_repo
            .create_with_relations(model, &input.tags, &ledger)
            .await?;

        tracing::info!(
            recipe_id = %recipe.id,
            author_id = %author.id,
            ingredients = ledger.len(),
            "Created recipe"
        );
        Ok(recipe)
    }

    /// Update a recipe. Only its author or an admin may do so.
    pub async fn update(
        &self,
        actor: &user::Model,
        recipe_id: &str,
        input: UpdateRecipeInput,
    ) -> AppResult<recipe::Model> {
        input.validate()?;

        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        if let Some(cooking_time) = input.cooking_time {
            self.check_cooking_time(cooking_time)?;
        }

        let ledger: Option<Vec<LedgerEntry>> = input
            .ingredients
            .as_ref()
            .map(|items| items.iter().map(LedgerEntry::from).collect());

        if let Some(ref ledger) = ledger {
            self.ledger.check(ledger).await?;
        }
        if let Some(ref tags) = input.tags {
            self.ensure_tags_exist(tags).await?;
        }

        let mut model: recipe::ActiveModel = recipe.into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(image) = input.image {
            model.image = Set(image);
        }
        if let Some(text) = input.text {
            model.text = Set(text);
        }
        if let Some(cooking_time) = input.cooking_time {
            model.cooking_time = Set(cooking_time);
        }

        let updated = self
            .recipe_repo
            .update_with_relations(model, input.tags.as_deref(), ledger.as_deref())
            .await?;

        tracing::info!(recipe_id = %updated.id, actor_id = %actor.id, "Updated recipe");
        Ok(updated)
    }

    /// Delete a recipe. Only its author or an admin may do so.
    pub async fn delete(&self, actor: &user::Model, recipe_id: &str) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        self.recipe_repo.delete(recipe_id).await?;

        tracing::info!(recipe_id = %recipe_id, actor_id = %actor.id, "Deleted recipe");
        Ok(())
    }

    /// Replace the ingredients of a recipe. Only its author or an admin may do so.
    pub async fn set_ingredients(
        &self,
        actor: &user::Model,
        recipe_id: &str,
        entries: &[LedgerEntry],
    ) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        ensure_can_modify(actor, &recipe)?;

        self.ledger.set_ingredients(recipe_id, entries).await
    }

    /// Get a recipe by ID.
    pub async fn get(&self, recipe_id: &str) -> AppResult<recipe::Model> {
        self.recipe_repo.get_by_id(recipe_id).await
    }

    /// Get the full view of a recipe.
    pub async fn detail(&self, recipe_id: &str, viewer_id: Option<&str>) -> AppResult<RecipeView> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        self.build_views(vec![recipe], viewer_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::RecipeNotFound(recipe_id.to_string()))
    }

    /// List recipes, newest first.
    ///
    /// `is_favorited` and `is_in_shopping_cart` only apply to a signed-in
    /// viewer and are ignored otherwise.
    pub async fn list(
        &self,
        query: RecipeListQuery,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<RecipeView>> {
        let filter = RecipeFilter {
            author_id: query.author_id,
            tag_slugs: query.tags,
            favorited_by: viewer_id
                .filter(|_| query.is_favorited)
                .map(str::to_string),
            in_cart_of: viewer_id
                .filter(|_| query.is_in_shopping_cart)
                .map(str::to_string),
        };

        let recipes = self.recipe_repo.find(&filter).await?;
        tracing::debug!(count = recipes.len(), ?filter, "Listed recipes");

        self.build_views(recipes, viewer_id).await
    }

    /// Public short link of a recipe.
    pub async fn short_link(&self, recipe_id: &str) -> AppResult<String> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;
        Ok(format!(
            "{}/s/{}",
            self.server_url.trim_end_matches('/'),
            recipe.short_code
        ))
    }

    /// Find the recipe a short code points to.
    pub async fn resolve_short_code(&self, code: &str) -> AppResult<recipe::Model> {
        self.recipe_repo
            .find_by_short_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Short link {code}")))
    }

    fn check_cooking_time(&self, cooking_time: i32) -> AppResult<()> {
        if cooking_time < self.limits.min_cooking_time || cooking_time > self.limits.max_cooking_time
        {
            return Err(AppError::Validation(format!(
                "Cooking time must be between {} and {} minutes",
                self.limits.min_cooking_time, self.limits.max_cooking_time
            )));
        }
        Ok(())
    }

    async fn ensure_tags_exist(&self, tag_ids: &[String]) -> AppResult<()> {
        let mut seen = HashSet::with_capacity(tag_ids.len());
        if let Some(dup) = tag_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AppError::Validation(format!("Tag {dup} is listed more than once")));
        }

        let found: HashSet<String> = self
            .tag_repo
            .find_by_ids(tag_ids)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        match tag_ids.iter().find(|id| !found.contains(*id)) {
            Some(missing) => Err(AppError::NotFound(format!("Tag {missing}"))),
            None => Ok(()),
        }
    }

    async fn unused_short_code(&self) -> AppResult<String> {
        for _ in 0..SHORT_CODE_ATTEMPTS {
            let code = self.id_gen.generate_short_code();
            if self.recipe_repo.find_by_short_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::Internal(
            "Could not allocate a recipe short code".to_string(),
        ))
    }

    /// Attach authors, tags, ingredients and viewer flags to recipes.
    async fn build_views(
        &self,
        recipes: Vec<recipe::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<RecipeView>> {
        if recipes.is_empty() {
            return Ok(vec![]);
        }

        let recipe_ids: Vec<String> = recipes.iter().map(|r| r.id.clone()).collect();
        let mut author_ids: Vec<String> = recipes.iter().map(|r| r.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut tags: HashMap<String, Vec<tag::Model>> = HashMap::new();
        for (recipe_id, tag) in self.tag_repo.find_by_recipes(&recipe_ids).await? {
            tags.entry(recipe_id).or_default().push(tag);
        }

        let mut ingredients = self.ledger.ingredients_by_recipe(&recipe_ids).await?;

        let (favorited, in_cart): (HashSet<String>, HashSet<String>) = match viewer_id {
            Some(viewer_id) => (
                self.favorite_repo
                    .find_favorited_among(viewer_id, &recipe_ids)
                    .await?
                    .into_iter()
                    .collect(),
                self.cart_repo
                    .find_in_cart_among(viewer_id, &recipe_ids)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        recipes
            .into_iter()
            .map(|recipe| -> AppResult<RecipeView> {
                let author = authors
                    .get(&recipe.author_id)
                    .cloned()
                    .ok_or_else(|| AppError::UserNotFound(recipe.author_id.clone()))?;

                Ok(RecipeView {
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    tags: tags.remove(&recipe.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                    id: recipe.id,
                    author,
                    name: recipe.name,
                    image: recipe.image,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                    created_at: recipe.created_at,
                })
            })
            .collect()
    }
}

fn ensure_can_modify(actor: &user::Model, recipe: &recipe::Model) -> AppResult<()> {
    if actor.is_admin || actor.id == recipe.author_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can modify this recipe".to_string(),
        ))
    }
}
