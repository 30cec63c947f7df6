//! Database repositories.

pub mod favorite;
pub mod ingredient;
pub mod ledger;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod user;

pub use favorite::FavoriteRepository;
pub use ingredient::IngredientRepository;
pub use ledger::{IngredientTotal, LedgerEntry, LedgerLine, LedgerRepository};
pub use recipe::{RecipeFilter, RecipeRepository};
pub use shopping_cart::ShoppingCartRepository;
pub use subscription::SubscriptionRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
