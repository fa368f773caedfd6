//! Foodgram domain engine.
//!
//! The engine owns the database connection and exposes every operation of
//! the recipe service: accounts, the tag and ingredient catalogs, recipes,
//! favorites, the shopping list and subscriptions. Each operation takes the
//! acting user as an explicit argument and runs inside one database
//! transaction.
//!
//! The shopping list aggregation itself lives in [`ShoppingReport`], which
//! is pure and knows nothing about storage or HTTP.

pub use error::EngineError;
pub use ingredients::Ingredient;
pub use memberships::{MembershipKey, RecipeList};
pub use ops::{Engine, EngineBuilder};
pub use pagination::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, PageRequest, Paginated};
pub use recipes::{
    IngredientAmount, Recipe, RecipeDraft, RecipeFilter, RecipeIngredient, RecipeSummary,
};
pub use shopping_list::{AggregatedLine, IngredientLine, ShoppingReport};
pub use subscriptions::{Subscription, SubscriptionKey};
pub use tags::Tag;
pub use users::{NewUser, Role, User, UserProfile};

mod error;
mod favorites;
mod ingredients;
mod memberships;
mod ops;
mod pagination;
mod recipe_ingredients;
mod recipe_tags;
mod recipes;
mod shopping_list;
mod shopping_list_entries;
mod subscriptions;
mod tags;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
