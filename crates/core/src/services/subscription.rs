//! Subscription service.

use std::collections::HashMap;

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{subscription, user},
    repositories::{SubscriptionRepository, UserRepository},
};
use sea_orm::Set;

/// Subscription service for business logic.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(subscription_repo: SubscriptionRepository, user_repo: UserRepository) -> Self {
        Self {
            subscription_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe `follower_id` to the recipes of `author_id`.
    pub async fn subscribe(
        &self,
        follower_id: &str,
        author_id: &str,
    ) -> AppResult<subscription::Model> {
        if follower_id == author_id {
            return Err(AppError::BadRequest(
                "Cannot subscribe to yourself".to_string(),
            ));
        }

        self.user_repo.get_by_id(author_id).await?;

        if self
            .subscription_repo
            .is_subscribed(follower_id, author_id)
            .await?
        {
            return Err(AppError::BadRequest("Already subscribed".to_string()));
        }

        let model = subscription::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let subscription = self.subscription_repo.create(model).await?;

        tracing::info!(follower_id = %follower_id, author_id = %author_id, "Subscribed");
        Ok(subscription)
    }

    /// Remove a subscription.
    pub async fn unsubscribe(&self, follower_id: &str, author_id: &str) -> AppResult<()> {
        if !self
            .subscription_repo
            .delete_by_pair(follower_id, author_id)
            .await?
        {
            return Err(AppError::BadRequest("Not subscribed".to_string()));
        }

        tracing::info!(follower_id = %follower_id, author_id = %author_id, "Unsubscribed");
        Ok(())
    }

    /// Check whether `follower_id` is subscribed to `author_id`.
    pub async fn is_subscribed(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.subscription_repo
            .is_subscribed(follower_id, author_id)
            .await
    }

    /// Authors a user is subscribed to, most recent subscription first.
    pub async fn authors(&self, follower_id: &str) -> AppResult<Vec<user::Model>> {
        let ids = self.subscription_repo.find_author_ids(follower_id).await?;
        let mut users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(ids.iter().filter_map(|id| users.remove(id)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            token: None,
            avatar_url: None,
            is_admin: false,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: DatabaseConnection) -> SubscriptionService {
        let db = Arc::new(db);
        SubscriptionService::new(
            SubscriptionRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_self_subscription() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db).subscribe("user1", "user1").await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_subscribe_unknown_author() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).subscribe("user1", "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribe() {
        let subscription = subscription::Model {
            id: "sub1".to_string(),
            follower_id: "user1".to_string(),
            author_id: "user2".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("user2")]])
            .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(0)) }]])
            .append_query_results([[subscription.clone()]])
            .into_connection();

        let result = service(db).subscribe("user1", "user2").await.unwrap();

        assert_eq!(result, subscription);
    }

    #[tokio::test]
    async fn test_authors_keep_subscription_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "author_id" => Value::from("user3") },
                btreemap! { "author_id" => Value::from("user2") },
            ]])
            .append_query_results([[create_test_user("user2"), create_test_user("user3")]])
            .into_connection();

        let authors = service(db).authors("user1").await.unwrap();
        let ids: Vec<_> = authors.iter().map(|u| u.id.as_str()).collect();

        assert_eq!(ids, vec!["user3", "user2"]);
    }
}
