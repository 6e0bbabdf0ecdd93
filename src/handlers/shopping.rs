use crate::{
    entities::shopping_item::{Model as ShoppingItemModel, ShoppingSection},
    handlers::ShowParams,
    services::shopping::{CreateShoppingItemInput, UpdateShoppingItemInput},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ShoppingItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity_text: String,
    pub section: ShoppingSection,
    pub checked: bool,
    pub added_at: DateTime<Utc>,
}

impl From<ShoppingItemModel> for ShoppingItemResponse {
    fn from(item: ShoppingItemModel) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity_text: item.quantity_text,
            section: item.section,
            checked: item.checked,
            added_at: item.added_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearCheckedResponse {
    pub removed: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shopping_items).post(create_shopping_item))
        .route(
            "/{id}",
            axum::routing::put(update_shopping_item).delete(delete_shopping_item),
        )
        .route("/{id}/toggle", post(toggle_shopping_item))
        .route("/clear", post(clear_checked_items))
}

/// List shopping entries, active first
#[utoipa::path(
    get,
    path = "/api/v1/shopping",
    params(ShowParams),
    responses((status = 200, description = "Shopping entries returned", body = [ShoppingItemResponse]))
)]
pub async fn list_shopping_items(
    State(state): State<AppState>,
    Query(params): Query<ShowParams>,
) -> ApiResult<Vec<ShoppingItemResponse>> {
    let items = state.services.shopping.list(params.include_all()).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(Into::into).collect(),
    )))
}

/// Add a shopping entry by hand
#[utoipa::path(
    post,
    path = "/api/v1/shopping",
    request_body = CreateShoppingItemInput,
    responses(
        (status = 200, description = "Shopping entry created", body = ShoppingItemResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_shopping_item(
    State(state): State<AppState>,
    Json(input): Json<CreateShoppingItemInput>,
) -> ApiResult<ShoppingItemResponse> {
    let item = state.services.shopping.create(input).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Edit a shopping entry
#[utoipa::path(
    put,
    path = "/api/v1/shopping/{id}",
    request_body = UpdateShoppingItemInput,
    responses(
        (status = 200, description = "Shopping entry updated", body = ShoppingItemResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_shopping_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateShoppingItemInput>,
) -> ApiResult<ShoppingItemResponse> {
    let item = state.services.shopping.update(id, input).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Toggle an entry's checked flag
#[utoipa::path(
    post,
    path = "/api/v1/shopping/{id}/toggle",
    responses(
        (status = 200, description = "Shopping entry toggled", body = ShoppingItemResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn toggle_shopping_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ShoppingItemResponse> {
    let item = state.services.shopping.toggle_checked(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Delete a single entry
#[utoipa::path(
    delete,
    path = "/api/v1/shopping/{id}",
    responses(
        (status = 200, description = "Shopping entry deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_shopping_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.shopping.delete(id).await?;
    Ok(Json(ApiResponse::message("Shopping entry deleted")))
}

/// Delete every checked entry
#[utoipa::path(
    post,
    path = "/api/v1/shopping/clear",
    responses((status = 200, description = "Checked entries removed", body = ClearCheckedResponse))
)]
pub async fn clear_checked_items(
    State(state): State<AppState>,
) -> ApiResult<ClearCheckedResponse> {
    let removed = state.services.shopping.clear_checked().await?;
    Ok(Json(ApiResponse::success(ClearCheckedResponse { removed })))
}
