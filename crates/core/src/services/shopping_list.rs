//! Shopping list aggregation.
//!
//! Sums the ingredient amounts of every recipe in a user's shopping cart.
//! Lines are keyed by ingredient name and measurement unit, so "Salt (g)"
//! and "Salt (tsp)" stay separate.

use std::collections::BTreeMap;

use foodgram_common::{AppError, AppResult};
use foodgram_db::repositories::{IngredientTotal, LedgerRepository, ShoppingCartRepository};
use serde::Serialize;

/// Aggregation key of a shopping list line.
///
/// Orders by name first, then by unit, comparing code points.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IngredientKey {
    pub name: String,
    pub measurement_unit: String,
}

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListLine {
    pub name: String,
    pub total_amount: i64,
    pub measurement_unit: String,
}

/// Merge grouped totals by [`IngredientKey`] and sort them.
///
/// The database already groups rows, but its ordering depends on collation.
pub(crate) fn aggregate_totals(totals: Vec<IngredientTotal>) -> Vec<ShoppingListLine> {
    let mut merged: BTreeMap<IngredientKey, i64> = BTreeMap::new();

    for total in totals {
        let key = IngredientKey {
            name: total.name,
            measurement_unit: total.measurement_unit,
        };
        *merged.entry(key).or_insert(0) += total.total_amount;
    }

    merged
        .into_iter()
        .map(|(key, total_amount)| ShoppingListLine {
            name: key.name,
            total_amount,
            measurement_unit: key.measurement_unit,
        })
        .collect()
}

/// Render a shopping list as plain text, one `"{name} - {amount} {unit}"` per line.
#[must_use]
pub fn render_text(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} - {} {}",
                line.name, line.total_amount, line.measurement_unit
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shopping list service for business logic.
#[derive(Clone)]
pub struct ShoppingListService {
    cart_repo: ShoppingCartRepository,
    ledger_repo: LedgerRepository,
}

impl ShoppingListService {
    /// Create a new shopping list service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, ledger_repo: LedgerRepository) -> Self {
        Self {
            cart_repo,
            ledger_repo,
        }
    }

    /// Build the shopping list of a user.
    ///
    /// Fails with [`AppError::EmptyCart`] when the cart holds no recipes.
    pub async fn aggregate(&self, user_id: &str) -> AppResult<Vec<ShoppingListLine>> {
        let recipe_ids = self.cart_repo.find_cart_recipe_ids(user_id).await?;
        if recipe_ids.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let totals = self
            .ledger_repo
            .sum_amounts_by_ingredient(&recipe_ids)
            .await?;
        let lines = aggregate_totals(totals);

        tracing::debug!(
            user_id = %user_id,
            recipes = recipe_ids.len(),
            lines = lines.len(),
            "Aggregated shopping list"
        );

        Ok(lines)
    }
}
