//! Ingredient service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use sea_orm::Set;

/// Ingredient service for business logic.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
    id_gen: IdGenerator,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self {
            ingredient_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List ingredients, optionally only those whose name starts with `name`.
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        self.ingredient_repo.find_all(name.map(str::trim)).await
    }

    /// Get an ingredient by ID.
    pub async fn get(&self, id: &str) -> AppResult<ingredient::Model> {
        self.ingredient_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))
    }

    /// Create an ingredient unless the same name and unit pair exists.
    ///
    /// Returns whether an ingredient was created.
    pub async fn ensure(&self, name: &str, measurement_unit: &str) -> AppResult<bool> {
        if self
            .ingredient_repo
            .find_by_name_and_unit(name, measurement_unit)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let model = ingredient::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            measurement_unit: Set(measurement_unit.to_string()),
        };
        self.ingredient_repo.create(model).await?;

        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ensure_creates_missing() {
        let salt = ingredient::Model {
            id: "ing1".to_string(),
            name: "Salt".to_string(),
            measurement_unit: "tsp".to_string(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ingredient::Model>::new()])
                .append_query_results([[salt]])
                .into_connection(),
        );

        let created = IngredientService::new(IngredientRepository::new(db))
            .ensure("Salt", "tsp")
            .await
            .unwrap();

        assert!(created);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ingredient::Model>::new()])
                .into_connection(),
        );

        let result = IngredientService::new(IngredientRepository::new(db))
            .get("missing")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("missing")));
    }
}
