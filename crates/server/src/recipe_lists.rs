//! Favorites, shopping cart and the shopping list download.

use api_types::recipe::RecipeShort;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{MembershipKey, RecipeList, ShoppingReport, User};

use crate::{ServerError, server::ServerState, views::map_summary};

async fn add(
    state: &ServerState,
    list: RecipeList,
    key: MembershipKey,
) -> Result<(StatusCode, Json<RecipeShort>), ServerError> {
    let summary = state.engine.add_to_recipe_list(list, key).await?;
    Ok((StatusCode::CREATED, Json(map_summary(summary))))
}

async fn remove(
    state: &ServerState,
    list: RecipeList,
    key: MembershipKey,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_from_recipe_list(list, key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShort>), ServerError> {
    add(&state, RecipeList::Favorites, MembershipKey::new(user.id, id)).await
}

pub async fn remove_favorite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    remove(&state, RecipeList::Favorites, MembershipKey::new(user.id, id)).await
}

pub async fn add_to_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeShort>), ServerError> {
    add(&state, RecipeList::ShoppingList, MembershipKey::new(user.id, id)).await
}

pub async fn remove_from_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    remove(&state, RecipeList::ShoppingList, MembershipKey::new(user.id, id)).await
}

/// Serve the aggregated shopping list as a plain text attachment.
pub async fn download_shopping_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<impl IntoResponse, ServerError> {
    let report = state.engine.shopping_report(user.id).await?;
    tracing::debug!(
        "shopping list of user {} has {} lines",
        user.id,
        report.lines().len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, ShoppingReport::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ShoppingReport::FILE_NAME),
            ),
        ],
        report.render(),
    ))
}
