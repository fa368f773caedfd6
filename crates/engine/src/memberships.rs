//! Per-user recipe lists (favorites and the shopping list).

/// The two recipe lists a user can toggle a recipe in and out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingList,
}

impl RecipeList {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingList => "shopping list",
        }
    }
}

/// Identifies a `(user, recipe)` entry in a [`RecipeList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub user_id: i32,
    pub recipe_id: i32,
}

impl MembershipKey {
    pub fn new(user_id: i32, recipe_id: i32) -> Self {
        Self { user_id, recipe_id }
    }
}
