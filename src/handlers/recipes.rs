use crate::{
    entities::recipe::Model as RecipeModel,
    services::enrichment::{NutritionEstimate, RecipeDraft},
    services::recipes::{CreateRecipeInput, UpdateRecipeInput},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Recipe as returned to clients. `nutrition` is present only once the
/// recipe has been successfully enriched; the seven fields always appear
/// together.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub total_time: i32,
    pub servings: i32,
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionEstimate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecipeModel> for RecipeResponse {
    fn from(recipe: RecipeModel) -> Self {
        let nutrition = match (
            recipe.calories,
            recipe.protein_g,
            recipe.carbs_g,
            recipe.fat_g,
            recipe.fiber_g,
            recipe.sugar_g,
            recipe.sodium_mg,
        ) {
            (
                Some(calories),
                Some(protein_g),
                Some(carbs_g),
                Some(fat_g),
                Some(fiber_g),
                Some(sugar_g),
                Some(sodium_mg),
            ) => Some(NutritionEstimate {
                calories,
                protein_g,
                carbs_g,
                fat_g,
                fiber_g,
                sugar_g,
                sodium_mg,
            }),
            _ => None,
        };

        Self {
            total_time: recipe.total_time(),
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            category_id: recipe.category_id,
            nutrition,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecipeListParams {
    /// Substring match against title and ingredients
    pub q: Option<String>,
    /// Restrict to recipes in this category
    pub category: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipeSearchRequest {
    pub query: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/search", post(search_recipe))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// List recipes, newest first, optionally filtered by `?q=` and `?category=`
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(RecipeListParams),
    responses((status = 200, description = "Recipes returned", body = [RecipeResponse]))
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<RecipeListParams>,
) -> ApiResult<Vec<RecipeResponse>> {
    let recipes = state
        .services
        .recipes
        .list(params.q.as_deref(), params.category)
        .await?;
    Ok(Json(ApiResponse::success(
        recipes.into_iter().map(Into::into).collect(),
    )))
}

/// Create a recipe; enrichment runs as a side effect when configured
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = CreateRecipeInput,
    responses(
        (status = 200, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(input): Json<CreateRecipeInput>,
) -> ApiResult<RecipeResponse> {
    let recipe = state.services.recipes.create(input).await?;
    Ok(Json(ApiResponse::success(recipe.into())))
}

/// Fetch a single recipe
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    responses(
        (status = 200, description = "Recipe returned", body = RecipeResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RecipeResponse> {
    let recipe = state.services.recipes.get(id).await?;
    Ok(Json(ApiResponse::success(recipe.into())))
}

/// Edit a recipe; changed ingredients or servings re-trigger enrichment
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    request_body = UpdateRecipeInput,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateRecipeInput>,
) -> ApiResult<RecipeResponse> {
    let recipe = state.services.recipes.update(id, input).await?;
    Ok(Json(ApiResponse::success(recipe.into())))
}

/// Delete a recipe
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    responses(
        (status = 200, description = "Recipe deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.recipes.delete(id).await?;
    Ok(Json(ApiResponse::message("Recipe deleted")))
}

/// AI web-search recipe lookup. Returns a draft for review; nothing is
/// persisted until the draft is saved through `POST /api/v1/recipes`.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/search",
    request_body = RecipeSearchRequest,
    responses(
        (status = 200, description = "Recipe draft returned", body = RecipeDraft),
        (status = 502, description = "Unparsable response from the AI service"),
        (status = 503, description = "AI service unavailable or unconfigured")
    )
)]
pub async fn search_recipe(
    State(state): State<AppState>,
    Json(request): Json<RecipeSearchRequest>,
) -> ApiResult<RecipeDraft> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(crate::errors::ServiceError::ValidationError(
            "query must not be empty".to_string(),
        ));
    }

    let draft = state.services.assistant.search_recipe(query).await?;
    Ok(Json(ApiResponse::success(draft)))
}
