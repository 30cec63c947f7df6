//! Recipe ingredient ledger service.
//!
//! A recipe's ledger is its full set of `(ingredient, amount)` rows. It is
//! validated up front and then replaced as a whole in one transaction.

use std::collections::{HashMap, HashSet};

use foodgram_common::{AppError, AppResult, config::RecipeLimits};
use foodgram_db::repositories::{
    IngredientRepository, LedgerEntry, LedgerLine, LedgerRepository, RecipeRepository,
};
use serde::Serialize;
use thiserror::Error;

/// Why a requested ledger was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerViolation {
    #[error("Ingredient list must not be empty")]
    Empty,

    #[error("Ingredient {0} is listed more than once")]
    DuplicateIngredient(String),

    #[error("Amount {amount} of ingredient {ingredient_id} must be between {min} and {max}")]
    AmountOutOfRange {
        ingredient_id: String,
        amount: i32,
        min: i32,
        max: i32,
    },
}

impl From<LedgerViolation> for AppError {
    fn from(violation: LedgerViolation) -> Self {
        Self::Validation(violation.to_string())
    }
}

/// Check a requested ledger without touching the store.
///
/// Emptiness is checked first, then duplicates, then amount bounds.
pub fn validate_ledger(entries: &[LedgerEntry], limits: &RecipeLimits) -> Result<(), LedgerViolation> {
    if entries.is_empty() {
        return Err(LedgerViolation::Empty);
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.ingredient_id.as_str()) {
            return Err(LedgerViolation::DuplicateIngredient(
                entry.ingredient_id.clone(),
            ));
        }
    }

    if let Some(entry) = entries
        .iter()
        .find(|e| e.amount < limits.min_amount || e.amount > limits.max_amount)
    {
        return Err(LedgerViolation::AmountOutOfRange {
            ingredient_id: entry.ingredient_id.clone(),
            amount: entry.amount,
            min: limits.min_amount,
            max: limits.max_amount,
        });
    }

    Ok(())
}

/// An ingredient of a recipe, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<LedgerLine> for RecipeIngredient {
    fn from(line: LedgerLine) -> Self {
        Self {
            id: line.ingredient.id,
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Ledger service for business logic.
#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    limits: RecipeLimits,
}

impl LedgerService {
    /// Create a new ledger service.
    #[must_use]
    pub const fn new(
        ledger_repo: LedgerRepository,
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        limits: RecipeLimits,
    ) -> Self {
        Self {
            ledger_repo,
            recipe_repo,
            ingredient_repo,
            limits,
        }
    }

    /// Check a requested ledger: validation first, then that every
    /// ingredient exists.
    ///
    /// Recipe create and update run this before writing the ledger in their
    /// own transaction.
    pub async fn check(&self, entries: &[LedgerEntry]) -> AppResult<()> {
        self.validate(entries)?;
        self.ensure_ingredients_exist(entries).await
    }

    /// Replace the complete ingredient set of a recipe.
    ///
    /// Either the whole new set is stored or the previous one is kept.
    pub async fn set_ingredients(&self, recipe_id: &str, entries: &[LedgerEntry]) -> AppResult<()> {
        self.validate(entries)?;
        self.recipe_repo.get_by_id(recipe_id).await?;
        self.ensure_ingredients_exist(entries).await?;

        self.ledger_repo.replace_ledger(recipe_id, entries).await?;

        tracing::info!(
            recipe_id = %recipe_id,
            ingredients = entries.len(),
            "Replaced recipe ingredients"
        );
        Ok(())
    }

    /// Get the ingredients of a recipe, ordered by ingredient name.
    pub async fn get_ingredients(&self, recipe_id: &str) -> AppResult<Vec<RecipeIngredient>> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        let lines = self.ledger_repo.find_by_recipe(recipe_id).await?;
        Ok(lines.into_iter().map(RecipeIngredient::from).collect())
    }

    /// Ingredients of several recipes, keyed by recipe ID.
    pub async fn ingredients_by_recipe(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<RecipeIngredient>>> {
        let mut ingredients: HashMap<String, Vec<RecipeIngredient>> = HashMap::new();
        for line in self.ledger_repo.find_by_recipes(recipe_ids).await? {
            ingredients
                .entry(line.recipe_id.clone())
                .or_default()
                .push(line.into());
        }
        Ok(ingredients)
    }

    fn validate(&self, entries: &[LedgerEntry]) -> AppResult<()> {
        validate_ledger(entries, &self.limits).map_err(|violation| {
            tracing::warn!(%violation, "Rejected ingredient list");
            violation.into()
        })
    }

    /// Fail with `NotFound` naming the first ingredient of `entries` that does not exist.
    async fn ensure_ingredients_exist(&self, entries: &[LedgerEntry]) -> AppResult<()> {
        let ids: Vec<String> = entries.iter().map(|e| e.ingredient_id.clone()).collect();
        let found: HashSet<String> = self
            .ingredient_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();

        match ids.into_iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(AppError::NotFound(format!("Ingredient {missing}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodgram_db::entities::{amount_ingredient, ingredient, recipe};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn limits() -> RecipeLimits {
        RecipeLimits::default()
    }

    fn create_test_recipe(id: &str) -> recipe::Model {
        recipe::Model {
            id: id.to_string(),
            author_id: "user1".to_string(),
            name: "Pancakes".to_string(),
            image: "recipes/images/pancakes.png".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 20,
            short_code: "aB3dE9".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_ingredient(id: &str, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id: id.to_string(),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    fn service(db: DatabaseConnection) -> LedgerService {
        let db = Arc::new(db);
        LedgerService::new(
            LedgerRepository::new(Arc::clone(&db)),
            RecipeRepository::new(Arc::clone(&db)),
            IngredientRepository::new(db),
            limits(),
        )
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_ledger(&[], &limits()), Err(LedgerViolation::Empty));
    }

    #[test]
    fn test_validate_duplicate() {
        let entries = [
            LedgerEntry::new("flour", 100),
            LedgerEntry::new("sugar", 10),
            LedgerEntry::new("flour", 50),
        ];

        assert_eq!(
            validate_ledger(&entries, &limits()),
            Err(LedgerViolation::DuplicateIngredient("flour".to_string()))
        );
    }

    #[test]
    fn test_validate_amount_bounds() {
        let limits = limits();

        for amount in [0, -5, 32_001] {
            let result = validate_ledger(&[LedgerEntry::new("flour", amount)], &limits);
            assert!(
                matches!(result, Err(LedgerViolation::AmountOutOfRange { amount: a, .. }) if a == amount)
            );
        }

        assert!(validate_ledger(&[LedgerEntry::new("flour", 1)], &limits).is_ok());
        assert!(validate_ledger(&[LedgerEntry::new("flour", 32_000)], &limits).is_ok());
    }

    #[test]
    fn test_duplicate_reported_before_amount() {
        let entries = [LedgerEntry::new("flour", 0), LedgerEntry::new("flour", 0)];

        assert!(matches!(
            validate_ledger(&entries, &limits()),
            Err(LedgerViolation::DuplicateIngredient(_))
        ));
    }

    #[test]
    fn test_violation_is_validation_error() {
        let err: AppError = LedgerViolation::Empty.into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_ingredients_rejects_before_store_access() {
        // No results queued: any store access would fail with a different error
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db).set_ingredients("recipe1", &[]).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_ingredients_unknown_recipe() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recipe::Model>::new()])
            .into_connection();

        let result = service(db)
            .set_ingredients("missing", &[LedgerEntry::new("flour", 100)])
            .await;

        assert!(matches!(result, Err(AppError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn test_set_ingredients_unknown_ingredient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe("recipe1")]])
            .append_query_results([[create_test_ingredient("flour", "flour", "g")]])
            .into_connection();

        let result = service(db)
            .set_ingredients(
                "recipe1",
                &[LedgerEntry::new("flour", 100), LedgerEntry::new("ghost", 5)],
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("ghost")));
    }

    #[tokio::test]
    async fn test_set_ingredients_replaces_ledger() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe("recipe1")]])
            .append_query_results([[
                create_test_ingredient("flour", "flour", "g"),
                create_test_ingredient("sugar", "sugar", "g"),
            ]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .into_connection();

        let result = service(db)
            .set_ingredients(
                "recipe1",
                &[LedgerEntry::new("flour", 200), LedgerEntry::new("sugar", 50)],
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_ingredients() {
        let row = amount_ingredient::Model {
            recipe_id: "recipe1".to_string(),
            ingredient_id: "flour".to_string(),
            amount: 200,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe("recipe1")]])
            .append_query_results([[(row, create_test_ingredient("flour", "flour", "g"))]])
            .into_connection();

        let ingredients = service(db).get_ingredients("recipe1").await.unwrap();

        assert_eq!(
            ingredients,
            vec![RecipeIngredient {
                id: "flour".to_string(),
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 200,
            }]
        );
    }

    #[tokio::test]
    async fn test_check_unknown_ingredient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ingredient::Model>::new()])
            .into_connection();

        let result = service(db).check(&[LedgerEntry::new("ghost", 5)]).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("ghost")));
    }

    #[tokio::test]
    async fn test_ingredients_by_recipe() {
        let row = |recipe_id: &str, amount| amount_ingredient::Model {
            recipe_id: recipe_id.to_string(),
            ingredient_id: "flour".to_string(),
            amount,
        };
        let flour = create_test_ingredient("flour", "flour", "g");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                (row("recipeA", 200), flour.clone()),
                (row("recipeB", 300), flour),
            ]])
            .into_connection();

        let by_recipe = service(db)
            .ingredients_by_recipe(&["recipeA".to_string(), "recipeB".to_string()])
            .await
            .unwrap();

        assert_eq!(by_recipe["recipeA"][0].amount, 200);
        assert_eq!(by_recipe["recipeB"][0].amount, 300);
    }
}
