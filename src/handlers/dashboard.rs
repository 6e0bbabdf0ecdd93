use crate::{
    handlers::categories::CategoryResponse,
    handlers::pantry::PantryItemResponse,
    handlers::recipes::RecipeResponse,
    handlers::shopping::ShoppingItemResponse,
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

const RECENT_RECIPE_LIMIT: u64 = 5;

/// Aggregated kitchen overview: counts plus the items that need attention.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub recipe_count: u64,
    pub pantry_count: u64,
    pub shopping_count: u64,
    /// Active items that are expired, due today, or within two days
    pub urgent_items: Vec<PantryItemResponse>,
    /// Active items at or below their low-stock threshold
    pub low_stock_items: Vec<PantryItemResponse>,
    pub recent_recipes: Vec<RecipeResponse>,
    pub unchecked_shopping: Vec<ShoppingItemResponse>,
    /// All categories with their recipe counts
    pub categories: Vec<CategoryResponse>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Kitchen dashboard summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses((status = 200, description = "Dashboard summary returned", body = DashboardResponse))
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    let recipe_count = state.services.recipes.count().await?;
    let pantry_count = state.services.pantry.count_active().await?;
    let shopping_count = state.services.shopping.count_active().await?;

    let active_items: Vec<PantryItemResponse> = state
        .services
        .pantry
        .list(false)
        .await?
        .into_iter()
        .map(PantryItemResponse::from)
        .collect();

    let low_stock_items = active_items
        .iter()
        .filter(|item| item.is_low_stock)
        .cloned()
        .collect();
    let urgent_items = active_items
        .into_iter()
        .filter(|item| item.freshness.is_urgent())
        .collect();

    let recent_recipes = state
        .services
        .recipes
        .recent(RECENT_RECIPE_LIMIT)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let unchecked_shopping = state
        .services
        .shopping
        .list(false)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let categories = state
        .services
        .categories
        .list_with_counts()
        .await?
        .into_iter()
        .map(|(category, count)| CategoryResponse::from_counted(category, count))
        .collect();

    Ok(Json(ApiResponse::success(DashboardResponse {
        recipe_count,
        pantry_count,
        shopping_count,
        urgent_items,
        low_stock_items,
        recent_recipes,
        unchecked_shopping,
        categories,
    })))
}
