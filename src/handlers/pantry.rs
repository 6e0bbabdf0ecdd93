use crate::{
    entities::pantry_item::{Model as PantryItemModel, StorageLocation},
    handlers::ShowParams,
    services::freshness::{self, FreshnessStatus},
    services::pantry::{
        CreatePantryItemInput, QuantityChange, UpdatePantryItemInput,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Pantry item as returned to clients, with derived freshness fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PantryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity_amount: Option<Decimal>,
    pub unit: String,
    pub low_stock_threshold: Option<Decimal>,
    pub storage: StorageLocation,
    pub sell_by_date: NaiveDate,
    pub notes: String,
    pub used: bool,
    pub is_low_stock: bool,
    pub days_remaining: i64,
    pub freshness: FreshnessStatus,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PantryItemModel> for PantryItemResponse {
    fn from(item: PantryItemModel) -> Self {
        let today = Utc::now().date_naive();
        Self {
            is_low_stock: item.is_low_stock(),
            days_remaining: freshness::days_remaining(item.sell_by_date, today),
            freshness: freshness::classify(item.sell_by_date, today),
            id: item.id,
            name: item.name,
            quantity_amount: item.quantity_amount,
            unit: item.unit,
            low_stock_threshold: item.low_stock_threshold,
            storage: item.storage,
            sell_by_date: item.sell_by_date,
            notes: item.notes,
            used: item.used,
            added_at: item.added_at,
            updated_at: item.updated_at,
        }
    }
}

/// Signed quantity adjustment: positive reduces, negative replenishes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustQuantityRequest {
    pub amount: Decimal,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pantry_items).post(create_pantry_item))
        .route(
            "/{id}",
            get(get_pantry_item)
                .put(update_pantry_item)
                .delete(delete_pantry_item),
        )
        .route("/{id}/used", post(mark_pantry_item_used))
        .route("/{id}/reduce", post(adjust_pantry_quantity))
}

/// List pantry items ordered by sell-by date
#[utoipa::path(
    get,
    path = "/api/v1/pantry",
    params(ShowParams),
    responses((status = 200, description = "Pantry items returned", body = [PantryItemResponse]))
)]
pub async fn list_pantry_items(
    State(state): State<AppState>,
    Query(params): Query<ShowParams>,
) -> ApiResult<Vec<PantryItemResponse>> {
    let items = state.services.pantry.list(params.include_all()).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(Into::into).collect(),
    )))
}

/// Add a pantry item
#[utoipa::path(
    post,
    path = "/api/v1/pantry",
    request_body = CreatePantryItemInput,
    responses(
        (status = 200, description = "Pantry item created", body = PantryItemResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_pantry_item(
    State(state): State<AppState>,
    Json(input): Json<CreatePantryItemInput>,
) -> ApiResult<PantryItemResponse> {
    let item = state.services.pantry.create(input).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Fetch a single pantry item
#[utoipa::path(
    get,
    path = "/api/v1/pantry/{id}",
    responses(
        (status = 200, description = "Pantry item returned", body = PantryItemResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_pantry_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PantryItemResponse> {
    let item = state.services.pantry.get(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Edit a pantry item
#[utoipa::path(
    put,
    path = "/api/v1/pantry/{id}",
    request_body = UpdatePantryItemInput,
    responses(
        (status = 200, description = "Pantry item updated", body = PantryItemResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_pantry_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePantryItemInput>,
) -> ApiResult<PantryItemResponse> {
    let item = state.services.pantry.update(id, input).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Mark an item as used up / retired
#[utoipa::path(
    post,
    path = "/api/v1/pantry/{id}/used",
    responses(
        (status = 200, description = "Pantry item marked used", body = PantryItemResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_pantry_item_used(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PantryItemResponse> {
    let item = state.services.pantry.mark_used(id).await?;
    Ok(Json(ApiResponse::success(item.into())))
}

/// Remove a pantry item entirely
#[utoipa::path(
    delete,
    path = "/api/v1/pantry/{id}",
    responses(
        (status = 200, description = "Pantry item deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_pantry_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.pantry.delete(id).await?;
    Ok(Json(ApiResponse::message("Pantry item deleted")))
}

/// Adjust a tracked quantity with a signed amount.
///
/// Positive amounts reduce (and may trigger shopping-list replenishment);
/// negative amounts add the absolute value back. Zero is rejected, as are
/// items without a numeric quantity.
#[utoipa::path(
    post,
    path = "/api/v1/pantry/{id}/reduce",
    request_body = AdjustQuantityRequest,
    responses(
        (status = 200, description = "Quantity adjusted", body = QuantityChange),
        (status = 400, description = "Invalid amount or untracked quantity"),
        (status = 404, description = "Not found")
    )
)]
pub async fn adjust_pantry_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustQuantityRequest>,
) -> ApiResult<QuantityChange> {
    let change = if request.amount > Decimal::ZERO {
        state
            .services
            .pantry
            .reduce_quantity(id, request.amount)
            .await?
    } else if request.amount < Decimal::ZERO {
        state
            .services
            .pantry
            .replenish_quantity(id, request.amount.abs())
            .await?
    } else {
        return Err(crate::errors::ServiceError::InvalidInput(
            "amount must not be zero".to_string(),
        ));
    };

    Ok(Json(ApiResponse::success(change)))
}
