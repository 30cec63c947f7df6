//! Load tags and ingredients from a JSON file.
//!
//! Usage: `foodgram-import <path>`, where the file looks like
//! `{"tags": [{"name", "slug"}], "ingredients": [{"name", "measurement_unit"}]}`.
//! Entries that already exist are skipped.

use std::sync::Arc;

use anyhow::Context;
use foodgram_common::Config;
use foodgram_core::{IngredientService, TagService};
use foodgram_db::repositories::{IngredientRepository, TagRepository};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Deserialize)]
struct ImportFile {
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    ingredients: Vec<IngredientRecord>,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: foodgram-import <path-to-json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("Can't read {path}"))?;
    let data: ImportFile =
        serde_json::from_str(&raw).with_context(|| format!("Can't parse {path}"))?;

    let config = Config::load()?;
    let db = Arc::new(foodgram_db::init(&config).await?);
    foodgram_db::migrate(&db).await?;

    let tag_service = TagService::new(TagRepository::new(Arc::clone(&db)));
    let ingredient_service = IngredientService::new(IngredientRepository::new(db));

    info!(count = data.tags.len(), "Starting tag import");
    let mut created = 0;
    for tag in &data.tags {
        if tag_service.ensure(&tag.name, &tag.slug).await? {
            created += 1;
        }
    }
    info!(created, skipped = data.tags.len() - created, "End tag import");

    info!(count = data.ingredients.len(), "Starting ingredient import");
    let mut created = 0;
    for ingredient in &data.ingredients {
        if ingredient_service
            .ensure(&ingredient.name, &ingredient.measurement_unit)
            .await?
        {
            created += 1;
        }
    }
    info!(
        created,
        skipped = data.ingredients.len() - created,
        "End ingredient import"
    );

    Ok(())
}
