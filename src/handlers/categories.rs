use crate::{
    entities::category::Model as CategoryModel,
    handlers::recipes::RecipeResponse,
    services::categories::CategoryInput,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Category as returned in listings, with its recipe count.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub recipe_count: u64,
    pub added_at: DateTime<Utc>,
}

impl CategoryResponse {
    pub fn from_counted(category: CategoryModel, recipe_count: u64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            recipe_count,
            added_at: category.added_at,
        }
    }
}

/// A single category with its recipes.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub added_at: DateTime<Utc>,
    pub recipes: Vec<RecipeResponse>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

/// List categories by name with recipe counts
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Categories returned", body = [CategoryResponse]))
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryResponse>> {
    let categories = state.services.categories.list_with_counts().await?;
    Ok(Json(ApiResponse::success(
        categories
            .into_iter()
            .map(|(category, count)| CategoryResponse::from_counted(category, count))
            .collect(),
    )))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Empty or duplicate name")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<CategoryResponse> {
    let category = state.services.categories.create(input).await?;
    Ok(Json(ApiResponse::success(CategoryResponse::from_counted(
        category, 0,
    ))))
}

/// Fetch a category and its recipes
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 200, description = "Category returned", body = CategoryDetailResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CategoryDetailResponse> {
    let category = state.services.categories.get(id).await?;
    let recipes = state.services.categories.recipes(id).await?;

    Ok(Json(ApiResponse::success(CategoryDetailResponse {
        id: category.id,
        name: category.name,
        added_at: category.added_at,
        recipes: recipes.into_iter().map(Into::into).collect(),
    })))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category renamed", body = CategoryResponse),
        (status = 400, description = "Empty or duplicate name"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<CategoryResponse> {
    let category = state.services.categories.update(id, input).await?;
    let recipe_count = state.services.categories.recipes(id).await?.len() as u64;
    Ok(Json(ApiResponse::success(CategoryResponse::from_counted(
        category,
        recipe_count,
    ))))
}

/// Delete a category, detaching its recipes
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.categories.delete(id).await?;
    Ok(Json(ApiResponse::message("Category deleted")))
}
