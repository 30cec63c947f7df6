//! Recipe repository.

use std::sync::Arc;

use crate::entities::{Favorite, Recipe, RecipeTag, ShoppingCart, Tag, favorite, recipe, recipe_tag, shopping_cart, tag};
use crate::repositories::ledger::{LedgerEntry, write_ledger};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait, TryIntoModel,
    sea_query::{Expr, Query},
};

/// Filters for listing recipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Only recipes by this author.
    pub author_id: Option<String>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user.
    pub favorited_by: Option<String>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<String>,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Find a recipe by its short code.
    pub async fn find_by_short_code(&self, code: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::ShortCode.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List recipes matching a filter, newest first.
    pub async fn find(&self, filter: &RecipeFilter) -> AppResult<Vec<recipe::Model>> {
        let mut query = Recipe::find().order_by_desc(recipe::Column::CreatedAt);

        if let Some(author_id) = &filter.author_id {
            query = query.filter(recipe::Column::AuthorId.eq(author_id.as_str()));
        }

        if !filter.tag_slugs.is_empty() {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column((RecipeTag, recipe_tag::Column::RecipeId))
                        .from(RecipeTag)
                        .inner_join(
                            Tag,
                            Expr::col((Tag, tag::Column::Id))
                                .equals((RecipeTag, recipe_tag::Column::TagId)),
                        )
                        .and_where(tag::Column::Slug.is_in(filter.tag_slugs.clone()))
                        .to_owned(),
                ),
            );
        }

        if let Some(user_id) = &filter.favorited_by {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(favorite::Column::RecipeId)
                        .from(Favorite)
                        .and_where(favorite::Column::UserId.eq(user_id.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(user_id) = &filter.in_cart_of {
            query = query.filter(
                recipe::Column::Id.in_subquery(
                    Query::select()
                        .column(shopping_cart::Column::RecipeId)
                        .from(ShoppingCart)
                        .and_where(shopping_cart::Column::UserId.eq(user_id.as_str()))
                        .to_owned(),
                ),
            );
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a recipe together with its tags and ledger.
    ///
    /// Everything is written in one transaction.
    pub async fn create_with_relations(
        &self,
        model: recipe::ActiveModel,
        tag_ids: &[String],
        ledger: &[LedgerEntry],
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        write_tags(&txn, &recipe.id, tag_ids)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        write_ledger(&txn, &recipe.id, ledger)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Update a recipe and optionally replace its tags and ledger.
    ///
    /// `model` must be built from the stored recipe so unchanged fields are
    /// known. `None` leaves the corresponding relation untouched.
    pub async fn update_with_relations(
        &self,
        model: recipe::ActiveModel,
        tag_ids: Option<&[String]>,
        ledger: Option<&[LedgerEntry]>,
    ) -> AppResult<recipe::Model> {
        let recipe_id = match &model.id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => id.clone(),
            ActiveValue::NotSet => {
                return Err(AppError::Internal("Recipe update without id".to_string()));
            }
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = if model.is_changed() {
            model.update(&txn).await
        } else {
            model.try_into_model()
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(tag_ids) = tag_ids {
            write_tags(&txn, &recipe_id, tag_ids)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(ledger) = ledger {
            write_ledger(&txn, &recipe_id, ledger)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Delete a recipe. Tags, ledger, favorites and cart entries cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Replace the tag set of a recipe on `conn`.
async fn write_tags<C: ConnectionTrait>(
    conn: &C,
    recipe_id: &str,
    tag_ids: &[String],
) -> Result<(), DbErr> {
    RecipeTag::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let rows = tag_ids.iter().map(|tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id.to_string()),
        tag_id: Set(tag_id.clone()),
    });

    RecipeTag::insert_many(rows)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
