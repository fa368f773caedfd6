mod common;

use sea_orm::{ConnectionTrait, Statement};

use common::{draft, engine_with_db, ingredient, register, tag};
use engine::{EngineError, MembershipKey, RecipeList, ShoppingReport};

fn summary(report: &ShoppingReport) -> Vec<(String, String, i64)> {
    report
        .lines()
        .iter()
        .map(|line| {
            (
                line.name.clone(),
                line.measurement_unit.clone(),
                line.total_amount,
            )
        })
        .collect()
}

#[tokio::test]
async fn empty_list_renders_empty_body() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let report = engine.shopping_report(alice.id).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(report.render(), "");
}

#[tokio::test]
async fn single_recipe_single_ingredient() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let breakfast = tag(&engine, "breakfast", "#E26C2D").await;
    let flour = ingredient(&engine, "Flour", "g").await;

    let recipe = engine
        .create_recipe(alice.id, draft("Bread", &[breakfast], &[(flour, 200)]))
        .await
        .unwrap();
    engine
        .add_to_recipe_list(
            RecipeList::ShoppingList,
            MembershipKey::new(alice.id, recipe.id),
        )
        .await
        .unwrap();

    let report = engine.shopping_report(alice.id).await.unwrap();
    assert_eq!(
        summary(&report),
        vec![("Flour".to_string(), "g".to_string(), 200)]
    );
    assert_eq!(report.render(), "Flour (g) - 200 \n");
}

#[tokio::test]
async fn amounts_merge_across_recipes() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let dessert = tag(&engine, "dessert", "#8775D2").await;
    let flour = ingredient(&engine, "Flour", "g").await;
    let sugar = ingredient(&engine, "Sugar", "g").await;

    let bread = engine
        .create_recipe(alice.id, draft("Bread", &[dessert], &[(flour, 200)]))
        .await
        .unwrap();
    // Someone else's recipe can be queued too.
    let cake = engine
        .create_recipe(
            bob.id,
            draft("Cake", &[dessert], &[(sugar, 50), (flour, 150)]),
        )
        .await
        .unwrap();
    for recipe_id in [bread.id, cake.id] {
        engine
            .add_to_recipe_list(
                RecipeList::ShoppingList,
                MembershipKey::new(alice.id, recipe_id),
            )
            .await
            .unwrap();
    }

    let report = engine.shopping_report(alice.id).await.unwrap();
    assert_eq!(
        summary(&report),
        vec![
            ("Flour".to_string(), "g".to_string(), 350),
            ("Sugar".to_string(), "g".to_string(), 50),
        ]
    );
    assert_eq!(report.render(), "Flour (g) - 350 \nSugar (g) - 50 \n");

    // Bob's list is untouched by Alice's.
    assert!(engine.shopping_report(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn same_name_different_units_stay_apart() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let salt_g = ingredient(&engine, "Salt", "g").await;
    let salt_pinch = ingredient(&engine, "Salt", "pinch").await;

    let soup = engine
        .create_recipe(alice.id, draft("Soup", &[lunch], &[(salt_g, 5)]))
        .await
        .unwrap();
    let stew = engine
        .create_recipe(alice.id, draft("Stew", &[lunch], &[(salt_pinch, 2)]))
        .await
        .unwrap();
    for recipe_id in [soup.id, stew.id] {
        engine
            .add_to_recipe_list(
                RecipeList::ShoppingList,
                MembershipKey::new(alice.id, recipe_id),
            )
            .await
            .unwrap();
    }

    let report = engine.shopping_report(alice.id).await.unwrap();
    assert_eq!(
        summary(&report),
        vec![
            ("Salt".to_string(), "g".to_string(), 5),
            ("Salt".to_string(), "pinch".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn add_then_remove_restores_report() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let dinner = tag(&engine, "dinner", "#000000").await;
    let rice = ingredient(&engine, "Rice", "g").await;
    let oil = ingredient(&engine, "Oil", "ml").await;

    let pilaf = engine
        .create_recipe(alice.id, draft("Pilaf", &[dinner], &[(rice, 300)]))
        .await
        .unwrap();
    let fries = engine
        .create_recipe(alice.id, draft("Fries", &[dinner], &[(oil, 500)]))
        .await
        .unwrap();
    engine
        .add_to_recipe_list(
            RecipeList::ShoppingList,
            MembershipKey::new(alice.id, pilaf.id),
        )
        .await
        .unwrap();
    let before = engine.shopping_report(alice.id).await.unwrap();

    let key = MembershipKey::new(alice.id, fries.id);
    engine
        .add_to_recipe_list(RecipeList::ShoppingList, key)
        .await
        .unwrap();
    assert_ne!(engine.shopping_report(alice.id).await.unwrap(), before);
    engine
        .remove_from_recipe_list(RecipeList::ShoppingList, key)
        .await
        .unwrap();

    assert_eq!(engine.shopping_report(alice.id).await.unwrap(), before);
}

#[tokio::test]
async fn favorites_do_not_feed_the_report() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let dinner = tag(&engine, "dinner", "#000000").await;
    let rice = ingredient(&engine, "Rice", "g").await;
    let pilaf = engine
        .create_recipe(alice.id, draft("Pilaf", &[dinner], &[(rice, 300)]))
        .await
        .unwrap();

    engine
        .add_to_recipe_list(
            RecipeList::Favorites,
            MembershipKey::new(alice.id, pilaf.id),
        )
        .await
        .unwrap();

    assert!(engine.shopping_report(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_recipe_drops_it_from_shopping_lists() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let dinner = tag(&engine, "dinner", "#000000").await;
    let rice = ingredient(&engine, "Rice", "g").await;
    let pilaf = engine
        .create_recipe(alice.id, draft("Pilaf", &[dinner], &[(rice, 300)]))
        .await
        .unwrap();
    engine
        .add_to_recipe_list(
            RecipeList::ShoppingList,
            MembershipKey::new(bob.id, pilaf.id),
        )
        .await
        .unwrap();

    engine.delete_recipe(pilaf.id, alice.id).await.unwrap();

    assert!(engine.shopping_report(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn dangling_entry_is_an_integrity_error() {
    let (engine, db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO shopping_list_entries (user_id, recipe_id) VALUES (?, ?)",
        vec![alice.id.into(), 999.into()],
    ))
    .await
    .unwrap();

    let err = engine.shopping_report(alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Integrity(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_line_ingredient_is_an_integrity_error() {
    let (engine, db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let breakfast = tag(&engine, "breakfast", "#E26C2D").await;
    let flour = ingredient(&engine, "Flour", "g").await;

    let recipe = engine
        .create_recipe(alice.id, draft("Bread", &[breakfast], &[(flour, 200)]))
        .await
        .unwrap();
    engine
        .add_to_recipe_list(
            RecipeList::ShoppingList,
            MembershipKey::new(alice.id, recipe.id),
        )
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        vec![recipe.id.into(), 999.into(), 10.into()],
    ))
    .await
    .unwrap();

    let err = engine.shopping_report(alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Integrity(_)), "got {err:?}");
}
