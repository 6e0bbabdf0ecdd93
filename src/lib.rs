//! Larder API Library
//!
//! Kitchen inventory, shopping list, and recipe management with
//! AI-estimated nutrition enrichment.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use utoipa::OpenApi;

use config::AppConfig;
use events::EventSender;
use services::{
    CategoryService, EnrichmentClient, PantryService, RecipeService, ShoppingListService,
};

/// Shared service handles, cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    pub pantry: Arc<PantryService>,
    pub shopping: Arc<ShoppingListService>,
    pub recipes: Arc<RecipeService>,
    pub categories: Arc<CategoryService>,
    /// The raw AI client, used directly by the recipe search endpoint.
    pub assistant: Arc<dyn EnrichmentClient>,
}

/// Application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub services: AppServices,
}

impl AppState {
    /// Wires up the service graph over a connected database.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<AppConfig>,
        event_sender: EventSender,
        assistant: Arc<dyn EnrichmentClient>,
    ) -> Self {
        let shopping = Arc::new(ShoppingListService::new(db.clone(), event_sender.clone()));
        let pantry = Arc::new(PantryService::new(
            db.clone(),
            shopping.clone(),
            event_sender.clone(),
        ));
        let recipes = Arc::new(RecipeService::new(
            db.clone(),
            assistant.clone(),
            event_sender.clone(),
        ));
        let categories = Arc::new(CategoryService::new(db.clone()));

        Self {
            db,
            config,
            event_sender,
            services: AppServices {
                pantry,
                shopping,
                recipes,
                categories,
                assistant,
            },
        }
    }
}

/// Standard JSON envelope for API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// The versioned API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/pantry", handlers::pantry::router())
        .nest("/shopping", handlers::shopping::router())
        .nest("/recipes", handlers::recipes::router())
        .nest("/categories", handlers::categories::router())
        .nest("/dashboard", handlers::dashboard::router())
}

/// Builds the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(handlers::health::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi::ApiDoc::openapi())
}
