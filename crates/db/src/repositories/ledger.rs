//! Recipe ingredient ledger repository.
//!
//! The ledger is the set of `(ingredient, amount)` rows attached to a recipe.
//! It is only ever replaced as a whole, inside one transaction.

use std::sync::Arc;

use crate::entities::{AmountIngredient, Ingredient, amount_ingredient, ingredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

/// One requested ledger row: an ingredient and its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Ingredient ID.
    pub ingredient_id: String,
    /// Amount in the ingredient's measurement unit.
    pub amount: i32,
}

impl LedgerEntry {
    /// Create a ledger entry.
    #[must_use]
    pub fn new(ingredient_id: impl Into<String>, amount: i32) -> Self {
        Self {
            ingredient_id: ingredient_id.into(),
            amount,
        }
    }
}

/// A stored ledger row joined with its ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLine {
    /// Recipe the row belongs to.
    pub recipe_id: String,
    /// The ingredient.
    pub ingredient: ingredient::Model,
    /// Amount in the ingredient's measurement unit.
    pub amount: i32,
}

/// Summed amount for one `(name, measurement_unit)` group.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct IngredientTotal {
    /// Ingredient name.
    pub name: String,
    /// Measurement unit.
    pub measurement_unit: String,
    /// Sum of amounts across the selected recipes.
    pub total_amount: i64,
}

/// Ledger repository for database operations.
#[derive(Clone)]
pub struct LedgerRepository {
    db: Arc<DatabaseConnection>,
}

impl LedgerRepository {
    /// Create a new ledger repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get the ledger of a recipe, ordered by ingredient name.
    pub async fn find_by_recipe(&self, recipe_id: &str) -> AppResult<Vec<LedgerLine>> {
        self.find_by_recipes(&[recipe_id.to_string()]).await
    }

    /// Get the ledgers of several recipes, ordered by ingredient name.
    pub async fn find_by_recipes(&self, recipe_ids: &[String]) -> AppResult<Vec<LedgerLine>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = AmountIngredient::find()
            .filter(amount_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .find_also_related(Ingredient)
            .order_by_asc(ingredient::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, ingredient)| {
                ingredient.map(|ingredient| LedgerLine {
                    recipe_id: row.recipe_id,
                    ingredient,
                    amount: row.amount,
                })
            })
            .collect())
    }

    /// Replace the whole ledger of a recipe.
    ///
    /// Old rows are deleted and new rows inserted in a single transaction, so
    /// readers see either the previous set or the new one.
    pub async fn replace_ledger(&self, recipe_id: &str, entries: &[LedgerEntry]) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        write_ledger(&txn, recipe_id, entries)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum ledger amounts over the given recipes, grouped by ingredient
    /// name and measurement unit.
    pub async fn sum_amounts_by_ingredient(
        &self,
        recipe_ids: &[String],
    ) -> AppResult<Vec<IngredientTotal>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        AmountIngredient::find()
            .select_only()
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column_as(amount_ingredient::Column::Amount.sum(), "total_amount")
            .inner_join(Ingredient)
            .filter(amount_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
            .group_by(ingredient::Column::Name)
            .group_by(ingredient::Column::MeasurementUnit)
            .order_by_asc(ingredient::Column::Name)
            .into_model::<IngredientTotal>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Delete the ledger rows of a recipe and insert `entries` on `conn`.
///
/// Callers provide the transaction.
pub(crate) async fn write_ledger<C: ConnectionTrait>(
    conn: &C,
    recipe_id: &str,
    entries: &[LedgerEntry],
) -> Result<(), DbErr> {
    AmountIngredient::delete_many()
        .filter(amount_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await?;

    if entries.is_empty() {
        return Ok(());
    }

    let rows = entries.iter().map(|entry| amount_ingredient::ActiveModel {
        recipe_id: Set(recipe_id.to_string()),
        ingredient_id: Set(entry.ingredient_id.clone()),
        amount: Set(entry.amount),
    });

    AmountIngredient::insert_many(rows)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_ingredient(id: &str, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id: id.to_string(),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    fn create_test_row(recipe_id: &str, ingredient_id: &str, amount: i32) -> amount_ingredient::Model {
        amount_ingredient::Model {
            recipe_id: recipe_id.to_string(),
            ingredient_id: ingredient_id.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_find_by_recipe() {
        let flour = create_test_ingredient("ing1", "flour", "g");
        let sugar = create_test_ingredient("ing2", "sugar", "g");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    (create_test_row("recipe1", "ing1", 200), flour.clone()),
                    (create_test_row("recipe1", "ing2", 50), sugar.clone()),
                ]])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let lines = repo.find_by_recipe("recipe1").await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].ingredient, flour);
        assert_eq!(lines[0].amount, 200);
        assert_eq!(lines[1].ingredient, sugar);
        assert_eq!(lines[1].amount, 50);
    }

    #[tokio::test]
    async fn test_find_by_recipes_empty_input_skips_query() {
        // No query results queued: a query would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LedgerRepository::new(db);
        let lines = repo.find_by_recipes(&[]).await.unwrap();

        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_replace_ledger() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    // delete old rows
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 3,
                    },
                    // insert new rows
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                ])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let result = repo
            .replace_ledger(
                "recipe1",
                &[LedgerEntry::new("ing1", 200), LedgerEntry::new("ing2", 50)],
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_replace_ledger_insert_failure_is_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_exec_errors([DbErr::Custom("foreign key violation".to_string())])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let result = repo
            .replace_ledger("recipe1", &[LedgerEntry::new("missing", 10)])
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_sum_amounts_by_ingredient() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "name" => Value::from("flour"),
                        "measurement_unit" => Value::from("g"),
                        "total_amount" => Value::from(500_i64),
                    },
                    btreemap! {
                        "name" => Value::from("sugar"),
                        "measurement_unit" => Value::from("g"),
                        "total_amount" => Value::from(50_i64),
                    },
                ]])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let totals = repo
            .sum_amounts_by_ingredient(&["recipeA".to_string(), "recipeB".to_string()])
            .await
            .unwrap();

        assert_eq!(
            totals,
            vec![
                IngredientTotal {
                    name: "flour".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 500,
                },
                IngredientTotal {
                    name: "sugar".to_string(),
                    measurement_unit: "g".to_string(),
                    total_amount: 50,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_sum_amounts_without_recipes_is_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LedgerRepository::new(db);
        let totals = repo.sum_amounts_by_ingredient(&[]).await.unwrap();

        assert!(totals.is_empty());
    }
}
