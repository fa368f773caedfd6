//! Mapping from engine values to wire types.

use api_types::{
    ingredient::IngredientView,
    page::Page,
    recipe::{RecipeIngredientView, RecipeShort, RecipeView},
    subscription::SubscriptionView,
    tag::TagView,
    user::UserView,
};

pub fn map_page<T, U>(page: engine::Paginated<T>, map: impl FnMut(T) -> U) -> Page<U> {
    Page {
        count: page.count,
        results: page.results.into_iter().map(map).collect(),
    }
}

pub fn map_profile(profile: engine::UserProfile) -> UserView {
    UserView {
        id: profile.id,
        username: profile.username,
        email: profile.email,
        first_name: profile.first_name,
        last_name: profile.last_name,
        is_subscribed: profile.is_subscribed,
    }
}

pub fn map_tag(tag: engine::Tag) -> TagView {
    TagView {
        id: tag.id,
        name: tag.name,
        color: tag.color,
        slug: tag.slug,
    }
}

pub fn map_ingredient(ingredient: engine::Ingredient) -> IngredientView {
    IngredientView {
        id: ingredient.id,
        name: ingredient.name,
        measurement_unit: ingredient.measurement_unit,
    }
}

pub fn map_summary(recipe: engine::RecipeSummary) -> RecipeShort {
    RecipeShort {
        id: recipe.id,
        name: recipe.name,
        image: recipe.image,
        cooking_time: recipe.cooking_time,
    }
}

pub fn map_recipe(recipe: engine::Recipe) -> RecipeView {
    RecipeView {
        id: recipe.id,
        name: recipe.name,
        text: recipe.text,
        image: recipe.image,
        cooking_time: recipe.cooking_time,
        pub_date: recipe.pub_date,
        author: map_profile(recipe.author),
        tags: recipe.tags.into_iter().map(map_tag).collect(),
        ingredients: recipe
            .ingredients
            .into_iter()
            .map(|line| RecipeIngredientView {
                id: line.id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            })
            .collect(),
        is_favorited: recipe.is_favorited,
        is_in_shopping_cart: recipe.is_in_shopping_cart,
    }
}

pub fn map_subscription(subscription: engine::Subscription) -> SubscriptionView {
    let author = subscription.author;
    SubscriptionView {
        id: author.id,
        username: author.username,
        email: author.email,
        first_name: author.first_name,
        last_name: author.last_name,
        is_subscribed: author.is_subscribed,
        recipes: subscription.recipes.into_iter().map(map_summary).collect(),
        recipes_count: subscription.recipes_count,
    }
}
