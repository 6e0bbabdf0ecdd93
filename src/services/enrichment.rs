//! External AI client for nutrition estimation and recipe search.
//!
//! Both calls go through the Anthropic Messages API. Nutrition estimation
//! is gated by a content fingerprint (see [`ingredients_fingerprint`] and
//! `services::recipes`); recipe search is uncached and surfaces its
//! failures to the caller.

use crate::config::EnrichmentConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, instrument};
use utoipa::ToSchema;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const WEB_SEARCH_TOOL: &str = "web_search_20250305";

/// Content fingerprint over a recipe's enrichment-relevant fields.
///
/// Equal fingerprints mean the ingredients and serving count are unchanged
/// since the last successful estimate, so re-enrichment can be skipped.
pub fn ingredients_fingerprint(ingredients: &str, servings: i32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ingredients.as_bytes());
    hasher.update(b"|");
    hasher.update(servings.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// A complete per-serving nutrition estimate returned by the external
/// service. Partial estimates are never produced: a response missing any
/// field is a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NutritionEstimate {
    pub calories: i32,
    pub protein_g: Decimal,
    pub carbs_g: Decimal,
    pub fat_g: Decimal,
    pub fiber_g: Decimal,
    pub sugar_g: Decimal,
    pub sodium_mg: i32,
}

/// A recipe draft produced by the AI web-search lookup. Not persisted;
/// the caller reviews it and saves it through the normal recipe path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    #[serde(default)]
    pub prep_time: i32,
    #[serde(default)]
    pub cook_time: i32,
    #[serde(default = "default_servings")]
    pub servings: i32,
    #[serde(default)]
    pub source_url: Option<String>,
}

fn default_servings() -> i32 {
    1
}

/// Boundary to the external AI service.
///
/// Implementations are expected to tolerate responses wrapped in incidental
/// formatting (markdown code fences) and to treat anything that does not
/// parse into the full schema as a failure rather than a partial result.
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Whether an API key is available. Unconfigured clients cause the
    /// enrichment gate to skip silently and recipe search to report a
    /// user-visible error.
    fn is_configured(&self) -> bool;

    /// Estimate nutrition facts per serving for free-form ingredients text.
    async fn estimate_nutrition(
        &self,
        ingredients: &str,
        servings: i32,
    ) -> Result<NutritionEstimate, ServiceError>;

    /// Look up a real recipe on the web for the given query.
    async fn search_recipe(&self, query: &str) -> Result<RecipeDraft, ServiceError>;
}

/// Production client backed by the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    config: EnrichmentConfig,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Serialize)]
struct MessageParam<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Raw estimate payload as the model is instructed to emit it.
#[derive(Deserialize)]
struct EstimatePayload {
    calories: i64,
    protein_g: Decimal,
    carbs_g: Decimal,
    fat_g: Decimal,
    fiber_g: Decimal,
    sugar_g: Decimal,
    sodium_mg: i64,
}

impl AnthropicClient {
    pub fn new(config: EnrichmentConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    /// Build a client from an existing reqwest client (useful for tests).
    pub fn with_client(config: EnrichmentConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    async fn send_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<String, ServiceError> {
        if !self.config.is_configured() {
            return Err(ServiceError::ServiceUnavailable(
                "AI service API key is not configured".to_string(),
            ));
        }
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                ServiceError::ServiceUnavailable(format!("AI service unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ExternalApiError(format!(
                "AI service returned status {}",
                status
            )));
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            ServiceError::ExternalApiError(format!("malformed AI service response: {}", e))
        })?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| {
                ServiceError::ExternalApiError("AI response contained no text block".to_string())
            })
    }
}

#[async_trait]
impl EnrichmentClient for AnthropicClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    #[instrument(skip(self, ingredients))]
    async fn estimate_nutrition(
        &self,
        ingredients: &str,
        servings: i32,
    ) -> Result<NutritionEstimate, ServiceError> {
        let plural = if servings == 1 { "" } else { "s" };
        let prompt = format!(
            "Estimate the nutrition facts PER SERVING for this recipe \
             ({servings} serving{plural}).\n\n\
             Ingredients:\n{ingredients}\n\n\
             Respond ONLY with a JSON object, no other text:\n\
             {{\"calories\": <int>, \"protein_g\": <float>, \"carbs_g\": <float>, \
             \"fat_g\": <float>, \"fiber_g\": <float>, \"sugar_g\": <float>, \
             \"sodium_mg\": <int>}}"
        );

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            tools: None,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let text = self.send_message(&request).await?;
        parse_estimate(&text)
    }

    #[instrument(skip(self))]
    async fn search_recipe(&self, query: &str) -> Result<RecipeDraft, ServiceError> {
        let prompt = format!(
            "Search the web for a recipe for: {query}\n\n\
             Find a real recipe from a popular cooking website. \
             Return ONLY a JSON object (no markdown fences, no extra text) with these fields:\n\
             {{\"title\": \"...\", \"description\": \"A 1-2 sentence description\", \
             \"ingredients\": \"ingredient 1\\ningredient 2\\n...\", \
             \"instructions\": \"step 1\\nstep 2\\n...\", \
             \"prep_time\": <int minutes>, \"cook_time\": <int minutes>, \
             \"servings\": <int>, \"source_url\": \"https://...\"}}"
        );

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.search_max_tokens,
            tools: Some(vec![serde_json::json!({ "type": WEB_SEARCH_TOOL })]),
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let text = self.send_message(&request).await?;
        let cleaned = strip_code_fences(&text);
        debug!(bytes = cleaned.len(), "parsing recipe search response");

        serde_json::from_str(cleaned).map_err(|e| {
            ServiceError::ExternalApiError(format!("could not parse recipe response: {}", e))
        })
    }
}

/// Parse a nutrition estimate out of model output, tolerating markdown
/// code fences around the JSON.
pub fn parse_estimate(text: &str) -> Result<NutritionEstimate, ServiceError> {
    let cleaned = strip_code_fences(text);
    let payload: EstimatePayload = serde_json::from_str(cleaned).map_err(|e| {
        ServiceError::ExternalApiError(format!("could not parse nutrition estimate: {}", e))
    })?;

    if payload.calories < 0 || payload.sodium_mg < 0 {
        return Err(ServiceError::ExternalApiError(
            "nutrition estimate contained negative values".to_string(),
        ));
    }
    let calories = i32::try_from(payload.calories).map_err(|_| {
        ServiceError::ExternalApiError("nutrition estimate out of range".to_string())
    })?;
    let sodium_mg = i32::try_from(payload.sodium_mg).map_err(|_| {
        ServiceError::ExternalApiError("nutrition estimate out of range".to_string())
    })?;

    Ok(NutritionEstimate {
        calories,
        protein_g: payload.protein_g.round_dp(1),
        carbs_g: payload.carbs_g.round_dp(1),
        fat_g: payload.fat_g.round_dp(1),
        fiber_g: payload.fiber_g.round_dp(1),
        sugar_g: payload.sugar_g.round_dp(1),
        sodium_mg,
    })
}

/// Strip a wrapping markdown code fence (with optional language tag),
/// leaving the inner text. Non-fenced input is returned trimmed.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    body.rsplit_once("```").map_or(body, |(inner, _)| inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fingerprint_changes_with_content() {
        let a = ingredients_fingerprint("2 eggs\n1 cup flour", 2);
        let b = ingredients_fingerprint("2 eggs\n1 cup flour", 2);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        assert_ne!(a, ingredients_fingerprint("2 eggs\n1 cup flour", 4));
        assert_ne!(a, ingredients_fingerprint("3 eggs\n1 cup flour", 2));
    }

    #[test]
    fn strips_plain_fences() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_fences_with_language_tag() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn tolerates_missing_closing_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_complete_estimate() {
        let text = r#"{"calories": 300, "protein_g": 12.34, "carbs_g": 40.0,
            "fat_g": 10.5, "fiber_g": 2.0, "sugar_g": 5.1, "sodium_mg": 450}"#;
        let est = parse_estimate(text).unwrap();
        assert_eq!(est.calories, 300);
        assert_eq!(est.protein_g, dec!(12.3));
        assert_eq!(est.sodium_mg, 450);
    }

    #[test]
    fn parses_fenced_estimate() {
        let text = "```json\n{\"calories\": 120, \"protein_g\": 1, \"carbs_g\": 2, \
                    \"fat_g\": 3, \"fiber_g\": 4, \"sugar_g\": 5, \"sodium_mg\": 6}\n```";
        let est = parse_estimate(text).unwrap();
        assert_eq!(est.calories, 120);
        assert_eq!(est.fat_g, dec!(3));
    }

    #[test]
    fn missing_field_is_a_failure_not_a_partial_result() {
        let text = r#"{"calories": 300, "protein_g": 12.0}"#;
        assert!(matches!(
            parse_estimate(text),
            Err(ServiceError::ExternalApiError(_))
        ));
    }

    #[test]
    fn negative_values_are_rejected() {
        let text = r#"{"calories": -10, "protein_g": 1, "carbs_g": 2,
            "fat_g": 3, "fiber_g": 4, "sugar_g": 5, "sodium_mg": 6}"#;
        assert!(parse_estimate(text).is_err());
    }

    #[test]
    fn out_of_range_integers_are_rejected_not_truncated() {
        let text = r#"{"calories": 3000000000, "protein_g": 1, "carbs_g": 2,
            "fat_g": 3, "fiber_g": 4, "sugar_g": 5, "sodium_mg": 6}"#;
        assert!(matches!(
            parse_estimate(text),
            Err(ServiceError::ExternalApiError(_))
        ));

        let text = r#"{"calories": 100, "protein_g": 1, "carbs_g": 2,
            "fat_g": 3, "fiber_g": 4, "sugar_g": 5, "sodium_mg": 3000000000}"#;
        assert!(parse_estimate(text).is_err());
    }

    #[test]
    fn recipe_draft_defaults_fill_optional_fields() {
        let draft: RecipeDraft = serde_json::from_str(
            r#"{"title": "Pancakes", "ingredients": "flour", "instructions": "mix"}"#,
        )
        .unwrap();
        assert_eq!(draft.servings, 1);
        assert_eq!(draft.prep_time, 0);
        assert!(draft.source_url.is_none());
    }
}
