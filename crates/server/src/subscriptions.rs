//! Subscription endpoints

use api_types::{
    page::Page,
    subscription::{SubscriptionQuery, SubscriptionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{PageRequest, SubscriptionKey, User};

use crate::{
    ServerError,
    server::ServerState,
    views::{map_page, map_subscription},
};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Page<SubscriptionView>>, ServerError> {
    let page = state
        .engine
        .list_subscriptions(
            user.id,
            PageRequest::new(query.page, query.limit),
            query.recipes_limit,
        )
        .await?;
    Ok(Json(map_page(page, map_subscription)))
}

pub async fn subscribe(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<(StatusCode, Json<SubscriptionView>), ServerError> {
    let key = SubscriptionKey {
        user_id: user.id,
        author_id: id,
    };
    let subscription = state.engine.subscribe(key, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(map_subscription(subscription))))
}

pub async fn unsubscribe(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .unsubscribe(SubscriptionKey {
            user_id: user.id,
            author_id: id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
