use utoipa::OpenApi;

use crate::handlers;

/// OpenAPI document for the Larder API, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Larder API",
        description = "Kitchen inventory, shopping list, and recipe management with AI-estimated nutrition",
        version = env!("CARGO_PKG_VERSION"),
    ),
    paths(
        handlers::pantry::list_pantry_items,
        handlers::pantry::create_pantry_item,
        handlers::pantry::get_pantry_item,
        handlers::pantry::update_pantry_item,
        handlers::pantry::delete_pantry_item,
        handlers::pantry::mark_pantry_item_used,
        handlers::pantry::adjust_pantry_quantity,
        handlers::shopping::list_shopping_items,
        handlers::shopping::create_shopping_item,
        handlers::shopping::update_shopping_item,
        handlers::shopping::toggle_shopping_item,
        handlers::shopping::delete_shopping_item,
        handlers::shopping::clear_checked_items,
        handlers::recipes::list_recipes,
        handlers::recipes::create_recipe,
        handlers::recipes::get_recipe,
        handlers::recipes::update_recipe,
        handlers::recipes::delete_recipe,
        handlers::recipes::search_recipe,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::dashboard::dashboard,
    ),
    components(schemas(
        crate::entities::pantry_item::StorageLocation,
        crate::entities::shopping_item::ShoppingSection,
        crate::errors::ErrorResponse,
        crate::services::enrichment::NutritionEstimate,
        crate::services::enrichment::RecipeDraft,
        crate::services::freshness::FreshnessStatus,
        crate::services::pantry::CreatePantryItemInput,
        crate::services::pantry::UpdatePantryItemInput,
        crate::services::pantry::QuantityChange,
        crate::services::categories::CategoryInput,
        crate::services::recipes::CreateRecipeInput,
        crate::services::recipes::UpdateRecipeInput,
        crate::services::shopping::CreateShoppingItemInput,
        crate::services::shopping::UpdateShoppingItemInput,
        handlers::pantry::PantryItemResponse,
        handlers::pantry::AdjustQuantityRequest,
        handlers::shopping::ShoppingItemResponse,
        handlers::shopping::ClearCheckedResponse,
        handlers::recipes::RecipeResponse,
        handlers::recipes::RecipeSearchRequest,
        handlers::categories::CategoryResponse,
        handlers::categories::CategoryDetailResponse,
        handlers::dashboard::DashboardResponse,
    ))
)]
pub struct ApiDoc;
