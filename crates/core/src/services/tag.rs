//! Tag service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List all tags.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.find_all().await
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: &str) -> AppResult<tag::Model> {
        self.tag_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// Create a tag unless one with the same slug exists.
    ///
    /// Returns whether a tag was created.
    pub async fn ensure(&self, name: &str, slug: &str) -> AppResult<bool> {
        if self.tag_repo.find_by_slug(slug).await?.is_some() {
            return Ok(false);
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
        };
        self.tag_repo.create(model).await?;

        tracing::debug!(slug = %slug, "Created tag");
        Ok(true)
    }
}
