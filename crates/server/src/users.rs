//! Account endpoints

use api_types::{
    page::{Page, PageQuery},
    user::{SetPassword, UserCreated, UserNew, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewUser, PageRequest, Role, User};

use crate::{
    ServerError,
    server::ServerState,
    views::{map_page, map_profile},
};

/// Sign up. New accounts always get the plain user role.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let user = state
        .engine
        .register_user(NewUser {
            username: payload.username,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password: payload.password,
            role: Role::User,
        })
        .await?;
    tracing::info!("registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserView>>, ServerError> {
    let page = state
        .engine
        .list_users(Some(user.id), PageRequest::new(query.page, query.limit))
        .await?;
    Ok(Json(map_page(page, map_profile)))
}

pub async fn me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let profile = state.engine.user_profile(user.id, Some(user.id)).await?;
    Ok(Json(map_profile(profile)))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, ServerError> {
    let profile = state.engine.user_profile(id, Some(user.id)).await?;
    Ok(Json(map_profile(profile)))
}

pub async fn set_password(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<SetPassword>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_password(user.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
