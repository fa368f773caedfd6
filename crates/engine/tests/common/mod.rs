#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, IngredientAmount, NewUser, RecipeDraft, Role, User};
use migration::MigratorTrait;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_PASSWORD_COST: u32 = 4;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(TEST_PASSWORD_COST)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, username: &str) -> User {
    engine
        .register_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: username.to_string(),
            password: "secret-password".to_string(),
            role: Role::User,
        })
        .await
        .unwrap()
}

pub async fn tag(engine: &Engine, slug: &str, color: &str) -> i32 {
    engine.create_tag(slug, color, slug).await.unwrap().id
}

pub async fn ingredient(engine: &Engine, name: &str, unit: &str) -> i32 {
    engine.create_ingredient(name, unit).await.unwrap().id
}

pub fn draft(name: &str, tags: &[i32], ingredients: &[(i32, i32)]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        text: format!("How to cook {name}"),
        image: None,
        cooking_time: 15,
        tags: tags.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|&(ingredient_id, amount)| IngredientAmount {
                ingredient_id,
                amount,
            })
            .collect(),
    }
}
