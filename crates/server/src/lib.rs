use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run_with_listener};

mod catalog;
mod recipe_lists;
mod recipes;
mod server;
mod subscriptions;
mod users;
mod views;

pub mod types {
    pub mod page {
        pub use api_types::page::{Page, PageQuery};
    }

    pub mod user {
        pub use api_types::user::{SetPassword, UserCreated, UserNew, UserView};
    }

    pub mod catalog {
        pub use api_types::ingredient::{IngredientQuery, IngredientView};
        pub use api_types::tag::TagView;
    }

    pub mod recipe {
        pub use api_types::recipe::{
            IngredientAmount, RecipeIngredientView, RecipeQuery, RecipeShort, RecipeView,
            RecipeWrite,
        };
    }

    pub mod subscription {
        pub use api_types::subscription::{SubscriptionQuery, SubscriptionView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::NotPresent(_) | EngineError::InvalidPage(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidSubscription(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Integrity(_) | EngineError::Password(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Integrity(detail) => {
            tracing::error!("integrity error: {detail}");
            "internal server error".to_string()
        }
        EngineError::Password(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
