use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod page {
    use super::*;

    /// `?page=&limit=` query of list endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Page<T> {
        pub count: u64,
        pub results: Vec<T>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub password: String,
    }

    /// Returned by registration; never carries the password.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: i32,
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub is_subscribed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SetPassword {
        pub current_password: String,
        pub new_password: String,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: i32,
        pub name: String,
        /// `#RRGGBB`.
        pub color: String,
        pub slug: String,
    }
}

pub mod ingredient {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IngredientQuery {
        /// Case and accent insensitive name prefix.
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientView {
        pub id: i32,
        pub name: String,
        pub measurement_unit: String,
    }
}

pub mod recipe {
    use super::*;

    use crate::{tag::TagView, user::UserView};

    /// Query of `GET /recipes`.
    ///
    /// `tags` may repeat (`?tags=lunch&tags=dinner`). The two flags take `1`
    /// or `0` and only apply to authenticated callers.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecipeQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub author: Option<i32>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub is_favorited: Option<u8>,
        pub is_in_shopping_cart: Option<u8>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IngredientAmount {
        /// Ingredient id.
        pub id: i32,
        pub amount: i32,
    }

    /// Body of `POST /recipes` and `PATCH /recipes/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeWrite {
        pub name: String,
        pub text: String,
        pub image: Option<String>,
        pub cooking_time: i32,
        pub tags: Vec<i32>,
        pub ingredients: Vec<IngredientAmount>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeIngredientView {
        pub id: i32,
        pub name: String,
        pub measurement_unit: String,
        pub amount: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeView {
        pub id: i32,
        pub name: String,
        pub text: String,
        pub image: Option<String>,
        pub cooking_time: i32,
        pub pub_date: DateTime<Utc>,
        pub author: UserView,
        pub tags: Vec<TagView>,
        pub ingredients: Vec<RecipeIngredientView>,
        pub is_favorited: bool,
        pub is_in_shopping_cart: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecipeShort {
        pub id: i32,
        pub name: String,
        pub image: Option<String>,
        pub cooking_time: i32,
    }
}

pub mod subscription {
    use super::*;

    use crate::recipe::RecipeShort;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SubscriptionQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub recipes_limit: Option<u64>,
    }

    /// A followed author. The author fields are flattened next to the
    /// recipes.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubscriptionView {
        pub id: i32,
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub is_subscribed: bool,
        pub recipes: Vec<RecipeShort>,
        pub recipes_count: u64,
    }
}
