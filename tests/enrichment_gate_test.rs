mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{sample_estimate, StubAssistant, TestApp};
use larder_api::services::enrichment::{ingredients_fingerprint, EnrichmentClient};
use larder_api::services::recipes::{CreateRecipeInput, RecipeService, UpdateRecipeInput};
use serde_json::json;

fn recipe_input(ingredients: &str, servings: i32) -> CreateRecipeInput {
    CreateRecipeInput {
        title: "Weeknight pasta".to_string(),
        description: String::new(),
        ingredients: ingredients.to_string(),
        instructions: "Boil, combine, serve.".to_string(),
        category_id: None,
        prep_time: 10,
        cook_time: 20,
        servings,
    }
}

#[tokio::test]
async fn first_save_estimates_and_records_fingerprint() {
    let stub = Arc::new(StubAssistant::succeeding());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("1 lb spaghetti\n2 tbsp olive oil", 4))
        .await
        .expect("create failed");

    assert_eq!(stub.call_count(), 1);
    assert_eq!(recipe.calories, Some(sample_estimate().calories));
    assert_eq!(recipe.sodium_mg, Some(sample_estimate().sodium_mg));
    assert_eq!(
        recipe.ingredients_hash,
        ingredients_fingerprint(&recipe.ingredients, recipe.servings)
    );
}

#[tokio::test]
async fn unchanged_ingredients_skip_the_external_call() {
    let stub = Arc::new(StubAssistant::succeeding());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("2 eggs\n1 cup flour", 2))
        .await
        .expect("create failed");
    assert_eq!(stub.call_count(), 1);

    // A title-only edit leaves the fingerprint inputs untouched.
    let updated = app
        .state
        .services
        .recipes
        .update(
            recipe.id,
            UpdateRecipeInput {
                title: Some("Better pancakes".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");

    assert_eq!(stub.call_count(), 1);
    assert_eq!(updated.title, "Better pancakes");
    assert_eq!(updated.calories, recipe.calories);
    assert_eq!(updated.ingredients_hash, recipe.ingredients_hash);
}

#[tokio::test]
async fn changed_servings_re_enrich() {
    let stub = Arc::new(StubAssistant::succeeding());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("1 can beans", 2))
        .await
        .expect("create failed");
    assert_eq!(stub.call_count(), 1);

    let updated = app
        .state
        .services
        .recipes
        .update(
            recipe.id,
            UpdateRecipeInput {
                servings: Some(4),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");

    assert_eq!(stub.call_count(), 2);
    assert_ne!(updated.ingredients_hash, recipe.ingredients_hash);
    assert_eq!(
        updated.ingredients_hash,
        ingredients_fingerprint(&updated.ingredients, 4)
    );
}

#[tokio::test]
async fn failed_estimation_leaves_recipe_saved_and_retryable() {
    let failing = Arc::new(StubAssistant::failing());
    let app = TestApp::with_assistant(failing.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("1 whole chicken", 4))
        .await
        .expect("create must survive estimation failure");

    assert_eq!(failing.call_count(), 1);
    assert_eq!(recipe.calories, None);
    assert_eq!(recipe.protein_g, None);
    assert_eq!(recipe.sodium_mg, None);
    assert_eq!(recipe.ingredients_hash, "");

    // The fingerprint never advanced, so the next save over the same
    // content retries the estimate.
    let retry_stub = Arc::new(StubAssistant::succeeding());
    let retry_service = RecipeService::new(
        app.state.db.clone(),
        retry_stub.clone() as Arc<dyn EnrichmentClient>,
        app.state.event_sender.clone(),
    );

    let recovered = retry_service
        .update(recipe.id, UpdateRecipeInput::default())
        .await
        .expect("retry update failed");

    assert_eq!(retry_stub.call_count(), 1);
    assert_eq!(recovered.calories, Some(sample_estimate().calories));
    assert_eq!(
        recovered.ingredients_hash,
        ingredients_fingerprint(&recovered.ingredients, recovered.servings)
    );
}

#[tokio::test]
async fn failed_re_estimation_preserves_previous_nutrition() {
    let stub = Arc::new(StubAssistant::succeeding());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("2 eggs\n1 cup flour", 2))
        .await
        .expect("create failed");
    assert!(recipe.calories.is_some());

    // The ingredients change, but the new estimate fails: the stored
    // values and fingerprint must survive untouched.
    let failing_service = RecipeService::new(
        app.state.db.clone(),
        Arc::new(StubAssistant::failing()) as Arc<dyn EnrichmentClient>,
        app.state.event_sender.clone(),
    );
    let after = failing_service
        .update(
            recipe.id,
            UpdateRecipeInput {
                ingredients: Some("3 eggs\n2 cups flour".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update must survive estimation failure");

    assert_eq!(after.ingredients, "3 eggs\n2 cups flour");
    assert_eq!(after.calories, recipe.calories);
    assert_eq!(after.protein_g, recipe.protein_g);
    assert_eq!(after.sodium_mg, recipe.sodium_mg);
    assert_eq!(after.ingredients_hash, recipe.ingredients_hash);
}

#[tokio::test]
async fn unconfigured_client_is_never_called() {
    let stub = Arc::new(StubAssistant::unconfigured());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("3 apples", 1))
        .await
        .expect("create failed");

    assert_eq!(stub.call_count(), 0);
    assert_eq!(recipe.calories, None);
    assert_eq!(recipe.ingredients_hash, "");
}

#[tokio::test]
async fn empty_ingredients_skip_enrichment() {
    let stub = Arc::new(StubAssistant::succeeding());
    let app = TestApp::with_assistant(stub.clone()).await;

    let recipe = app
        .state
        .services
        .recipes
        .create(recipe_input("   ", 2))
        .await
        .expect("create failed");

    assert_eq!(stub.call_count(), 0);
    assert_eq!(recipe.calories, None);
}

#[tokio::test]
async fn api_exposes_nutrition_only_when_complete() {
    let app = TestApp::with_assistant(Arc::new(StubAssistant::succeeding())).await;

    let (status, body) = app
        .post(
            "/api/v1/recipes",
            json!({
                "title": "Chili",
                "ingredients": "2 cans beans\n1 lb beef",
                "instructions": "Simmer.",
                "servings": 4,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    assert_eq!(body["data"]["nutrition"]["calories"], json!(300));
    assert_eq!(body["data"]["nutrition"]["sodium_mg"], json!(450));

    // Without a working estimator the field is absent, not partial.
    let bare = TestApp::new().await;
    let (_, body) = bare
        .post(
            "/api/v1/recipes",
            json!({
                "title": "Chili",
                "ingredients": "2 cans beans",
                "instructions": "Simmer.",
            }),
        )
        .await;
    assert!(body["data"].get("nutrition").is_none());
}

#[tokio::test]
async fn recipe_search_reports_unavailable_when_unconfigured() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/recipes/search", json!({"query": "pad thai"}))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = app
        .post("/api/v1/recipes/search", json!({"query": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recipe_search_returns_a_draft() {
    let app = TestApp::with_assistant(Arc::new(StubAssistant::succeeding())).await;

    let (status, body) = app
        .post("/api/v1/recipes/search", json!({"query": "pad thai"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("Stub recipe for pad thai"));
    assert_eq!(body["data"]["servings"], json!(2));
}
