//! The module contains the `Recipe` views and the recipes table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{Tag, UserProfile};

/// A recipe with everything a client needs to render it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    pub text: String,
    /// Opaque image payload as sent by the client.
    pub image: Option<String>,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
    pub author: UserProfile,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// One ingredient line of a recipe, joined with the catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// Id of the ingredient (not of the line).
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Short form used by favorites, the shopping list and subscriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<Model> for RecipeSummary {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            image: model.image,
            cooking_time: model.cooking_time,
        }
    }
}

/// Requested amount of an ingredient in a [`RecipeDraft`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// Input for creating or replacing a recipe.
#[derive(Clone, Debug, Default)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    /// Tag ids.
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Filters for listing recipes.
///
/// `is_favorited` and `is_in_shopping_cart` only apply to authenticated
/// viewers and are ignored otherwise.
#[derive(Clone, Debug, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i32>,
    /// Tag slugs; a recipe matches if it has any of them.
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub cooking_time: i32,
    pub pub_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
    #[sea_orm(has_many = "super::recipe_tags::Entity")]
    RecipeTags,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::recipe_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
