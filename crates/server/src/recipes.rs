//! Recipe endpoints

use api_types::{
    page::Page,
    recipe::{RecipeQuery, RecipeView, RecipeWrite},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use engine::{IngredientAmount, PageRequest, RecipeDraft, RecipeFilter, User};

use crate::{
    ServerError,
    server::{ServerState, Viewer},
    views::{map_page, map_recipe},
};

fn draft_from(payload: RecipeWrite) -> RecipeDraft {
    RecipeDraft {
        name: payload.name,
        text: payload.text,
        image: payload.image,
        cooking_time: payload.cooking_time,
        tags: payload.tags,
        ingredients: payload
            .ingredients
            .into_iter()
            .map(|line| IngredientAmount {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect(),
    }
}

fn parse_flag(name: &str, value: Option<u8>) -> Result<Option<bool>, ServerError> {
    match value {
        None => Ok(None),
        Some(0) => Ok(Some(false)),
        Some(1) => Ok(Some(true)),
        Some(other) => Err(ServerError::Generic(format!(
            "{name} must be 0 or 1, got {other}"
        ))),
    }
}

pub async fn list(
    Extension(viewer): Extension<Viewer>,
    State(state): State<ServerState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Page<RecipeView>>, ServerError> {
    let filter = RecipeFilter {
        author_id: query.author,
        tags: query.tags,
        is_favorited: parse_flag("is_favorited", query.is_favorited)?,
        is_in_shopping_cart: parse_flag("is_in_shopping_cart", query.is_in_shopping_cart)?,
    };
    let page = state
        .engine
        .list_recipes(
            &filter,
            PageRequest::new(query.page, query.limit),
            viewer.id(),
        )
        .await?;
    Ok(Json(map_page(page, map_recipe)))
}

pub async fn get(
    Extension(viewer): Extension<Viewer>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeView>, ServerError> {
    let recipe = state.engine.recipe(id, viewer.id()).await?;
    Ok(Json(map_recipe(recipe)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<RecipeWrite>,
) -> Result<(StatusCode, Json<RecipeView>), ServerError> {
    let recipe = state
        .engine
        .create_recipe(user.id, draft_from(payload))
        .await?;
    tracing::debug!("user {} published recipe {}", user.id, recipe.id);
    Ok((StatusCode::CREATED, Json(map_recipe(recipe))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecipeWrite>,
) -> Result<Json<RecipeView>, ServerError> {
    let recipe = state
        .engine
        .update_recipe(id, draft_from(payload), user.id)
        .await?;
    Ok(Json(map_recipe(recipe)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_recipe(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
