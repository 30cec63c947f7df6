//! Subscription repository.

use std::sync::Arc;

use crate::entities::{Subscription, subscription};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if `follower_id` is subscribed to `author_id`.
    pub async fn is_subscribed(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        let count = Subscription::find()
            .filter(subscription::Column::FollowerId.eq(follower_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Get the IDs of the authors a user is subscribed to, newest first.
    pub async fn find_author_ids(&self, follower_id: &str) -> AppResult<Vec<String>> {
        Subscription::find()
            .select_only()
            .column(subscription::Column::AuthorId)
            .filter(subscription::Column::FollowerId.eq(follower_id))
            .order_by_desc(subscription::Column::CreatedAt)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a subscription.
    pub async fn create(
        &self,
        model: subscription::ActiveModel,
    ) -> AppResult<subscription::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a subscription. Returns whether a row was deleted.
    pub async fn delete_by_pair(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        let result = Subscription::delete_many()
            .filter(subscription::Column::FollowerId.eq(follower_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    #[tokio::test]
    async fn test_is_subscribed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(1)),
                }]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        assert!(repo.is_subscribed("user1", "user2").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        assert!(repo.delete_by_pair("user1", "user2").await.unwrap());
    }
}
