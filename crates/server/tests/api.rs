use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, NewUser, Role};

async fn engine_for(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .database(db.clone())
        .password_cost(MIN_BCRYPT_COST)
        .build()
        .await
        .unwrap()
}

const MIN_BCRYPT_COST: u32 = 4;

/// App with two users (`alice`, `bob`), one tag and two ingredients.
async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let seed = engine_for(&db).await;
    for username in ["alice", "bob"] {
        seed.register_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password: format!("{username}-password"),
            role: Role::User,
        })
        .await
        .unwrap();
    }
    seed.create_tag("Breakfast", "#E26C2D", "breakfast")
        .await
        .unwrap();
    seed.create_ingredient("Flour", "g").await.unwrap();
    seed.create_ingredient("Sugar", "g").await.unwrap();

    server::router(engine_for(&db).await)
}

fn basic(username: &str) -> String {
    let token = STANDARD.encode(format!("{username}:{username}-password"));
    format!("Basic {token}")
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn recipe_body(name: &str, ingredients: Value) -> Value {
    json!({
        "name": name,
        "text": "Mix and bake.",
        "image": null,
        "cooking_time": 30,
        "tags": [1],
        "ingredients": ingredients,
    })
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = app().await;

    let (status, _) = send(&app, request("GET", "/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request("GET", "/recipes/download_shopping_cart", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bad = Request::builder()
        .uri("/users/me")
        .header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("alice:nope")))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(&app, request("GET", "/users/me", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn register_then_read_catalog_anonymously() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/users",
            None,
            Some(json!({
                "username": "carol",
                "email": "carol@example.com",
                "first_name": "Carol",
                "last_name": "King",
                "password": "carol-password",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "carol");
    assert!(body.get("password").is_none());

    let (status, body) = send_json(&app, request("GET", "/tags", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "breakfast");

    let (status, body) = send_json(&app, request("GET", "/ingredients?name=fl", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Flour");

    let (status, _) = send(&app, request("GET", "/tags/99", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shopping_cart_download_aggregates_recipes() {
    let app = app().await;

    let (status, bread) = send_json(
        &app,
        request(
            "POST",
            "/recipes",
            Some("alice"),
            Some(recipe_body("Bread", json!([{"id": 1, "amount": 200}]))),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, cake) = send_json(
        &app,
        request(
            "POST",
            "/recipes",
            Some("bob"),
            Some(recipe_body(
                "Cake",
                json!([{"id": 1, "amount": 150}, {"id": 2, "amount": 50}]),
            )),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for recipe in [&bread, &cake] {
        let uri = format!("/recipes/{}/shopping_cart", recipe["id"]);
        let (status, body) = send_json(&app, request("POST", &uri, Some("alice"), None)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], recipe["id"]);
    }
    let uri = format!("/recipes/{}/shopping_cart", bread["id"]);
    let (status, _) = send(&app, request("POST", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(request(
            "GET",
            "/recipes/download_shopping_cart",
            Some("alice"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        res.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=shop-list.txt"
    );
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Flour (g) - 350 \nSugar (g) - 50 \n");

    let (status, body) = send(
        &app,
        request("GET", "/recipes/download_shopping_cart", Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn recipe_flags_follow_the_viewer() {
    let app = app().await;
    let (_, recipe) = send_json(
        &app,
        request(
            "POST",
            "/recipes",
            Some("alice"),
            Some(recipe_body("Bread", json!([{"id": 1, "amount": 200}]))),
        ),
    )
    .await;
    let id = &recipe["id"];

    let uri = format!("/recipes/{id}/favorite");
    let (status, _) = send(&app, request("POST", &uri, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/recipes/{id}");
    let (_, body) = send_json(&app, request("GET", &uri, Some("bob"), None)).await;
    assert_eq!(body["is_favorited"], true);
    let (_, body) = send_json(&app, request("GET", &uri, None, None)).await;
    assert_eq!(body["is_favorited"], false);

    let (_, body) = send_json(
        &app,
        request("GET", "/recipes?is_favorited=1", Some("bob"), None),
    )
    .await;
    assert_eq!(body["count"], 1);
    let (_, body) = send_json(
        &app,
        request("GET", "/recipes?tags=breakfast&tags=dinner", None, None),
    )
    .await;
    assert_eq!(body["count"], 1);
    let (status, _) = send(
        &app,
        request("GET", "/recipes?is_favorited=2", Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("DELETE", &uri, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/recipes/{id}/favorite");
    let (status, _) = send(&app, request("DELETE", &uri, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("DELETE", &uri, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subscriptions_over_http() {
    let app = app().await;

    let (status, _) = send(&app, request("POST", "/users/1/subscribe", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send_json(
        &app,
        request("POST", "/users/2/subscribe?recipes_limit=1", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["is_subscribed"], true);

    let (status, body) = send_json(
        &app,
        request("GET", "/users/subscriptions", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, request("DELETE", "/users/2/subscribe", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
