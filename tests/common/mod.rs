#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use larder_api::{
    config::AppConfig,
    db,
    errors::ServiceError,
    events::{self, EventSender},
    services::enrichment::{EnrichmentClient, NutritionEstimate, RecipeDraft},
    AppState,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// What the stub AI client should do when called.
pub enum StubBehavior {
    Succeed(NutritionEstimate),
    Fail,
    Unconfigured,
}

/// Test double for the external AI service that counts invocations.
pub struct StubAssistant {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubAssistant {
    pub fn succeeding() -> Self {
        Self::new(StubBehavior::Succeed(sample_estimate()))
    }

    pub fn failing() -> Self {
        Self::new(StubBehavior::Fail)
    }

    pub fn unconfigured() -> Self {
        Self::new(StubBehavior::Unconfigured)
    }

    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentClient for StubAssistant {
    fn is_configured(&self) -> bool {
        !matches!(self.behavior, StubBehavior::Unconfigured)
    }

    async fn estimate_nutrition(
        &self,
        _ingredients: &str,
        _servings: i32,
    ) -> Result<NutritionEstimate, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Succeed(estimate) => Ok(estimate.clone()),
            StubBehavior::Fail => Err(ServiceError::ExternalApiError(
                "stub estimator failure".to_string(),
            )),
            StubBehavior::Unconfigured => Err(ServiceError::ServiceUnavailable(
                "stub estimator unconfigured".to_string(),
            )),
        }
    }

    async fn search_recipe(&self, query: &str) -> Result<RecipeDraft, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Succeed(_) => Ok(RecipeDraft {
                title: format!("Stub recipe for {}", query),
                description: String::new(),
                ingredients: "1 cup stub".to_string(),
                instructions: "combine".to_string(),
                prep_time: 5,
                cook_time: 10,
                servings: 2,
                source_url: None,
            }),
            StubBehavior::Fail => Err(ServiceError::ExternalApiError(
                "stub search failure".to_string(),
            )),
            StubBehavior::Unconfigured => Err(ServiceError::ServiceUnavailable(
                "stub search unconfigured".to_string(),
            )),
        }
    }
}

/// A nutrition estimate with distinctive values for assertions.
pub fn sample_estimate() -> NutritionEstimate {
    NutritionEstimate {
        calories: 300,
        protein_g: dec!(12.5),
        carbs_g: dec!(40.0),
        fat_g: dec!(10.0),
        fiber_g: dec!(2.5),
        sugar_g: dec!(5.0),
        sodium_mg: 450,
    }
}

/// Test harness: application state over a fresh in-memory sqlite database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_assistant(Arc::new(StubAssistant::unconfigured())).await
    }

    pub async fn with_assistant(assistant: Arc<dyn EnrichmentClient>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory db.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), Arc::new(cfg), event_sender, assistant);
        let router = larder_api::app(state.clone());

        Self { router, state }
    }

    /// Issues a request against the in-process router and returns the
    /// status plus parsed JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}
