mod common;

use common::{draft, engine_with_db, ingredient, register, tag};
use engine::{EngineError, MembershipKey, PageRequest, RecipeFilter, RecipeList};

#[tokio::test]
async fn create_recipe_returns_full_view() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let breakfast = tag(&engine, "breakfast", "#E26C2D").await;
    let eggs = ingredient(&engine, "Eggs", "pcs").await;
    let milk = ingredient(&engine, "Milk", "ml").await;

    let recipe = engine
        .create_recipe(
            alice.id,
            draft("Omelette", &[lunch, breakfast], &[(eggs, 3), (milk, 50)]),
        )
        .await
        .unwrap();

    assert_eq!(recipe.name, "Omelette");
    assert_eq!(recipe.author.username, "alice");
    assert!(!recipe.author.is_subscribed);
    let slugs: Vec<_> = recipe.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, vec!["breakfast", "lunch"]);
    let lines: Vec<_> = recipe
        .ingredients
        .iter()
        .map(|l| (l.id, l.name.as_str(), l.amount))
        .collect();
    assert_eq!(lines, vec![(eggs, "Eggs", 3), (milk, "Milk", 50)]);
    assert!(!recipe.is_favorited);
    assert!(!recipe.is_in_shopping_cart);
}

#[tokio::test]
async fn draft_validation_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let eggs = ingredient(&engine, "Eggs", "pcs").await;

    let err = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch], &[(eggs, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch], &[(eggs, 1), (eggs, 2)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch], &[(eggs + 100, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch + 100], &[(eggs, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_recipe(alice.id, draft("Omelette", &[], &[(eggs, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let page = engine
        .list_recipes(&RecipeFilter::default(), PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn only_the_author_updates_and_deletes() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let dinner = tag(&engine, "dinner", "#000000").await;
    let eggs = ingredient(&engine, "Eggs", "pcs").await;
    let ham = ingredient(&engine, "Ham", "g").await;

    let recipe = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch], &[(eggs, 3)]))
        .await
        .unwrap();

    let err = engine
        .update_recipe(recipe.id, draft("Mine now", &[lunch], &[(eggs, 1)]), bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine.delete_recipe(recipe.id, bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let updated = engine
        .update_recipe(
            recipe.id,
            draft("Ham omelette", &[dinner], &[(ham, 100), (eggs, 2)]),
            alice.id,
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Ham omelette");
    assert_eq!(updated.pub_date, recipe.pub_date);
    assert_eq!(updated.tags.len(), 1);
    assert_eq!(updated.tags[0].id, dinner);
    let amounts: Vec<_> = updated.ingredients.iter().map(|l| (l.id, l.amount)).collect();
    assert_eq!(amounts, vec![(ham, 100), (eggs, 2)]);

    engine.delete_recipe(recipe.id, alice.id).await.unwrap();
    let err = engine.recipe(recipe.id, None).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn toggles_report_existing_and_missing_entries() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let eggs = ingredient(&engine, "Eggs", "pcs").await;
    let recipe = engine
        .create_recipe(alice.id, draft("Omelette", &[lunch], &[(eggs, 3)]))
        .await
        .unwrap();

    for list in [RecipeList::Favorites, RecipeList::ShoppingList] {
        let key = MembershipKey::new(alice.id, recipe.id);
        let summary = engine.add_to_recipe_list(list, key).await.unwrap();
        assert_eq!(summary.id, recipe.id);
        assert_eq!(summary.cooking_time, 15);

        let err = engine.add_to_recipe_list(list, key).await.unwrap_err();
        assert!(matches!(err, EngineError::ExistingKey(_)));

        engine.remove_from_recipe_list(list, key).await.unwrap();
        let err = engine.remove_from_recipe_list(list, key).await.unwrap_err();
        assert!(matches!(err, EngineError::NotPresent(_)));

        let err = engine
            .add_to_recipe_list(list, MembershipKey::new(alice.id, recipe.id + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }
}

#[tokio::test]
async fn list_filters_and_viewer_flags() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let lunch = tag(&engine, "lunch", "#49B64E").await;
    let dinner = tag(&engine, "dinner", "#000000").await;
    let eggs = ingredient(&engine, "Eggs", "pcs").await;

    let first = engine
        .create_recipe(alice.id, draft("First", &[lunch], &[(eggs, 1)]))
        .await
        .unwrap();
    let second = engine
        .create_recipe(bob.id, draft("Second", &[dinner], &[(eggs, 2)]))
        .await
        .unwrap();
    engine
        .add_to_recipe_list(RecipeList::Favorites, MembershipKey::new(alice.id, second.id))
        .await
        .unwrap();

    let all = engine
        .list_recipes(&RecipeFilter::default(), PageRequest::default(), Some(alice.id))
        .await
        .unwrap();
    assert_eq!(all.count, 2);
    let ids: Vec<_> = all.results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(all.results[0].is_favorited);
    assert!(!all.results[1].is_favorited);

    let by_tag = RecipeFilter {
        tags: vec!["lunch".to_string()],
        ..RecipeFilter::default()
    };
    let page = engine
        .list_recipes(&by_tag, PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, first.id);

    let by_author = RecipeFilter {
        author_id: Some(bob.id),
        ..RecipeFilter::default()
    };
    let page = engine
        .list_recipes(&by_author, PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, second.id);

    let favorited = RecipeFilter {
        is_favorited: Some(true),
        ..RecipeFilter::default()
    };
    let page = engine
        .list_recipes(&favorited, PageRequest::default(), Some(alice.id))
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, second.id);

    // Anonymous viewers get no flag filtering and no flags.
    let page = engine
        .list_recipes(&favorited, PageRequest::default(), None)
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert!(page.results.iter().all(|r| !r.is_favorited));

    let not_in_cart = RecipeFilter {
        is_in_shopping_cart: Some(false),
        ..RecipeFilter::default()
    };
    let page = engine
        .list_recipes(&not_in_cart, PageRequest::default(), Some(bob.id))
        .await
        .unwrap();
    assert_eq!(page.count, 2);

    let page = engine
        .list_recipes(&RecipeFilter::default(), PageRequest::new(Some(2), Some(1)), None)
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, first.id);

    let err = engine
        .list_recipes(&RecipeFilter::default(), PageRequest::new(Some(0), None), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPage(_)));
}
