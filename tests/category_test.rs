mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn create_category(app: &TestApp, name: &str) -> String {
    let (status, body) = app.post("/api/v1/categories", json!({ "name": name })).await;
    assert_eq!(status, StatusCode::OK, "create category failed: {body}");
    body["data"]["id"].as_str().expect("category id").to_string()
}

async fn create_recipe(app: &TestApp, title: &str, category_id: Option<&str>) -> String {
    let mut payload = json!({
        "title": title,
        "ingredients": "1 cup flour",
        "instructions": "mix",
        "servings": 2
    });
    if let Some(id) = category_id {
        payload["category_id"] = Value::String(id.to_string());
    }
    let (status, body) = app.post("/api/v1/recipes", payload).await;
    assert_eq!(status, StatusCode::OK, "create recipe failed: {body}");
    body["data"]["id"].as_str().expect("recipe id").to_string()
}

#[tokio::test]
async fn categories_list_with_recipe_counts() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    create_category(&app, "Breakfast").await;

    create_recipe(&app, "Stew", Some(&dinner)).await;
    create_recipe(&app, "Curry", Some(&dinner)).await;
    create_recipe(&app, "Toast", None).await;

    let (status, body) = app.get("/api/v1/categories").await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().expect("category list");
    assert_eq!(list.len(), 2);
    // Alphabetical by name.
    assert_eq!(list[0]["name"], "Breakfast");
    assert_eq!(list[0]["recipe_count"], 0);
    assert_eq!(list[1]["name"], "Dinner");
    assert_eq!(list[1]["recipe_count"], 2);
}

#[tokio::test]
async fn duplicate_names_are_rejected_case_insensitively() {
    let app = TestApp::new().await;

    create_category(&app, "Desserts").await;

    let (status, _) = app
        .post("/api/v1/categories", json!({ "name": "desserts" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/categories", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_keeps_names_unique() {
    let app = TestApp::new().await;

    let soups = create_category(&app, "Soups").await;
    create_category(&app, "Salads").await;

    // Renaming onto another category's name is rejected.
    let (status, _) = app
        .put(
            &format!("/api/v1/categories/{soups}"),
            json!({ "name": "SALADS" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Renaming to itself (case change only) is allowed.
    let (status, body) = app
        .put(
            &format!("/api/v1/categories/{soups}"),
            json!({ "name": "SOUPS" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "SOUPS");
}

#[tokio::test]
async fn recipe_creation_requires_an_existing_category() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/recipes",
            json!({
                "title": "Orphan",
                "ingredients": "1 egg",
                "instructions": "fry",
                "category_id": "00000000-0000-0000-0000-000000000000"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipes_filter_by_category() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    let stew = create_recipe(&app, "Stew", Some(&dinner)).await;
    create_recipe(&app, "Toast", None).await;

    let (status, body) = app
        .get(&format!("/api/v1/recipes?category={dinner}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().expect("recipe list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], stew.as_str());
    assert_eq!(list[0]["category_id"], dinner.as_str());
}

#[tokio::test]
async fn explicit_null_detaches_the_category() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    let stew = create_recipe(&app, "Stew", Some(&dinner)).await;

    // An update that omits category_id leaves the association alone.
    let (status, body) = app
        .put(&format!("/api/v1/recipes/{stew}"), json!({ "title": "Beef stew" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_id"], dinner.as_str());

    // An explicit null detaches.
    let (status, body) = app
        .put(
            &format!("/api/v1/recipes/{stew}"),
            json!({ "category_id": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["category_id"].is_null());
}

#[tokio::test]
async fn deleting_a_category_detaches_its_recipes() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    let stew = create_recipe(&app, "Stew", Some(&dinner)).await;

    let (status, _) = app.delete(&format!("/api/v1/categories/{dinner}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/v1/categories/{dinner}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The recipe survives without a category.
    let (status, body) = app.get(&format!("/api/v1/recipes/{stew}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["category_id"].is_null());
}

#[tokio::test]
async fn category_detail_lists_its_recipes_newest_first() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    create_recipe(&app, "Stew", Some(&dinner)).await;
    create_recipe(&app, "Curry", Some(&dinner)).await;
    create_recipe(&app, "Toast", None).await;

    let (status, body) = app.get(&format!("/api/v1/categories/{dinner}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Dinner");
    let recipes = body["data"]["recipes"].as_array().expect("recipes");
    let titles: Vec<&str> = recipes
        .iter()
        .map(|r| r["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Curry", "Stew"]);
}

#[tokio::test]
async fn dashboard_reports_category_counts() {
    let app = TestApp::new().await;

    let dinner = create_category(&app, "Dinner").await;
    create_recipe(&app, "Stew", Some(&dinner)).await;

    let (status, body) = app.get("/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let categories = body["data"]["categories"].as_array().expect("categories");
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["name"], "Dinner");
    assert_eq!(categories[0]["recipe_count"], 1);
}
