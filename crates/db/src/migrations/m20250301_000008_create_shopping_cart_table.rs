//! Create shopping_cart table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShoppingCart::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShoppingCart::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShoppingCart::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(ShoppingCart::RecipeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ShoppingCart::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shopping_cart_user")
                            .from(ShoppingCart::Table, ShoppingCart::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shopping_cart_recipe")
                            .from(ShoppingCart::Table, ShoppingCart::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, recipe_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_shopping_cart_user_recipe")
                    .table(ShoppingCart::Table)
                    .col(ShoppingCart::UserId)
                    .col(ShoppingCart::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoppingCart::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ShoppingCart {
    Table,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}
