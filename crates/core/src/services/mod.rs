//! Business logic services.

#![allow(missing_docs)]

pub mod favorite;
pub mod ingredient;
pub mod ledger;
pub mod recipe;
pub mod shopping_cart;
pub mod shopping_list;
pub mod subscription;
pub mod tag;
pub mod user;

pub use favorite::FavoriteService;
pub use ingredient::IngredientService;
pub use ledger::{LedgerService, LedgerViolation, RecipeIngredient, validate_ledger};
pub use recipe::{
    CreateRecipeInput, IngredientAmountInput, RecipeListQuery, RecipeService, RecipeView,
    UpdateRecipeInput,
};
pub use shopping_cart::ShoppingCartService;
pub use shopping_list::{IngredientKey, ShoppingListLine, ShoppingListService, render_text};
pub use subscription::SubscriptionService;
pub use tag::TagService;
pub use user::{RegisterUserInput, UserService};
