//! Tag and ingredient endpoints. Both catalogs are read-only over HTTP.

use api_types::{
    ingredient::{IngredientQuery, IngredientView},
    tag::TagView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    ServerError,
    server::ServerState,
    views::{map_ingredient, map_tag},
};

pub async fn list_tags(State(state): State<ServerState>) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = state.engine.list_tags().await?;
    Ok(Json(tags.into_iter().map(map_tag).collect()))
}

pub async fn get_tag(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<TagView>, ServerError> {
    Ok(Json(map_tag(state.engine.tag(id).await?)))
}

/// `?name=` filters by name prefix.
pub async fn list_ingredients(
    State(state): State<ServerState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<IngredientView>>, ServerError> {
    let ingredients = state
        .engine
        .list_ingredients(query.name.as_deref())
        .await?;
    Ok(Json(ingredients.into_iter().map(map_ingredient).collect()))
}

pub async fn get_ingredient(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientView>, ServerError> {
    Ok(Json(map_ingredient(state.engine.ingredient(id).await?)))
}
