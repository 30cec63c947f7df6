//! Create amount_ingredient (recipe ingredient ledger) table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AmountIngredient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AmountIngredient::RecipeId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AmountIngredient::IngredientId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AmountIngredient::Amount)
                            .integer()
                            .not_null()
                            .check(Expr::col(AmountIngredient::Amount).gt(0)),
                    )
                    // One amount row per (recipe, ingredient)
                    .primary_key(
                        Index::create()
                            .col(AmountIngredient::RecipeId)
                            .col(AmountIngredient::IngredientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_amount_ingredient_recipe")
                            .from(AmountIngredient::Table, AmountIngredient::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_amount_ingredient_ingredient")
                            .from(AmountIngredient::Table, AmountIngredient::IngredientId)
                            .to(Ingredient::Table, Ingredient::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: ingredient_id (grouping by ingredient)
        manager
            .create_index(
                Index::create()
                    .name("idx_amount_ingredient_ingredient_id")
                    .table(AmountIngredient::Table)
                    .col(AmountIngredient::IngredientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AmountIngredient::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AmountIngredient {
    Table,
    RecipeId,
    IngredientId,
    Amount,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}

#[derive(Iden)]
enum Ingredient {
    Table,
    Id,
}
