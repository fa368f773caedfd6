use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{catalog, recipe_lists, recipes, subscriptions, users};
use engine::{Engine, EngineError, User};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The caller of a public route, if it sent valid credentials.
#[derive(Clone, Debug)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|user| user.id)
    }
}

async fn check_credentials(
    state: &ServerState,
    header: &Authorization<Basic>,
) -> Result<User, StatusCode> {
    if header.username().is_empty() || header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    match state
        .engine
        .authenticate(header.username(), header.password())
        .await
    {
        Ok(user) => Ok(user),
        Err(EngineError::InvalidCredentials) => Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Require HTTP Basic credentials and expose the account as an `Extension<User>`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let user = check_credentials(&state, &header).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Like [`auth`], but anonymous callers pass through as `Viewer(None)`.
/// Wrong credentials are still rejected.
async fn identify(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let viewer = match auth_header {
        Some(TypedHeader(header)) => Some(check_credentials(&state, &header).await?),
        None => None,
    };

    request.extensions_mut().insert(Viewer(viewer));
    Ok(next.run(request).await)
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let public = Router::new()
        .route("/users", post(users::register))
        .route("/tags", get(catalog::list_tags))
        .route("/tags/{id}", get(catalog::get_tag))
        .route("/ingredients", get(catalog::list_ingredients))
        .route("/ingredients/{id}", get(catalog::get_ingredient))
        .route("/recipes", get(recipes::list))
        .route("/recipes/{id}", get(recipes::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), identify));

    let protected = Router::new()
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/set_password", post(users::set_password))
        .route("/users/subscriptions", get(subscriptions::list))
        .route("/users/{id}", get(users::get))
        .route(
            "/users/{id}/subscribe",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
        .route("/recipes", post(recipes::create))
        .route(
            "/recipes/download_shopping_cart",
            get(recipe_lists::download_shopping_cart),
        )
        .route(
            "/recipes/{id}",
            axum::routing::patch(recipes::update).delete(recipes::delete),
        )
        .route(
            "/recipes/{id}/favorite",
            post(recipe_lists::add_favorite).delete(recipe_lists::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(recipe_lists::add_to_cart).delete(recipe_lists::remove_from_cart),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(protected).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
