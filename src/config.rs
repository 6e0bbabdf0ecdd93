use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
const CONFIG_DIR: &str = "config";

const DEFAULT_ENRICHMENT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_ENRICHMENT_MAX_TOKENS: u32 = 300;
const DEFAULT_SEARCH_MAX_TOKENS: u32 = 1500;
const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 30;

/// Placeholder value that counts as "no key configured". Kept so a checked-in
/// sample config cannot silently enable paid API calls.
const UNCONFIGURED_API_KEY: &str = "your-api-key-here";

/// Settings for the external nutrition/recipe AI service.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct EnrichmentConfig {
    /// API key for the Anthropic Messages API. `None` or the placeholder
    /// value disables enrichment entirely.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier to request.
    #[serde(default = "default_enrichment_model")]
    pub model: String,

    /// Token budget for nutrition estimation responses.
    #[serde(default = "default_enrichment_max_tokens")]
    pub max_tokens: u32,

    /// Token budget for recipe search responses.
    #[serde(default = "default_search_max_tokens")]
    pub search_max_tokens: u32,

    /// HTTP timeout for calls to the external service.
    #[serde(default = "default_enrichment_timeout_secs")]
    pub timeout_secs: u64,
}

impl EnrichmentConfig {
    /// Whether a usable API key is present.
    pub fn is_configured(&self) -> bool {
        matches!(
            self.api_key.as_deref().map(str::trim),
            Some(key) if !key.is_empty() && key != UNCONFIGURED_API_KEY
        )
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_enrichment_model(),
            max_tokens: default_enrichment_max_tokens(),
            search_max_tokens: default_search_max_tokens(),
            timeout_secs: default_enrichment_timeout_secs(),
        }
    }
}

fn default_enrichment_model() -> String {
    DEFAULT_ENRICHMENT_MODEL.to_string()
}
fn default_enrichment_max_tokens() -> u32 {
    DEFAULT_ENRICHMENT_MAX_TOKENS
}
fn default_search_max_tokens() -> u32 {
    DEFAULT_SEARCH_MAX_TOKENS
}
fn default_enrichment_timeout_secs() -> u64 {
    DEFAULT_ENRICHMENT_TIMEOUT_SECS
}

/// Application configuration loaded from files and `LARDER__*` environment
/// variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (sqlite or postgres)
    #[validate(length(min = 1))]
    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Run embedded migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub enrichment: EnrichmentConfig,
}

fn default_db_max_connections() -> u32 {
    DEFAULT_DB_MAX_CONNECTIONS
}
fn default_db_min_connections() -> u32 {
    DEFAULT_DB_MIN_CONNECTIONS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl AppConfig {
    /// Minimal constructor used by tests and tooling.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            auto_migrate: false,
            host,
            port,
            environment,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            enrichment: EnrichmentConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load configuration from `config/default.toml`, an optional
/// `config/{environment}.toml` overlay, and `LARDER__*` environment
/// variables (e.g. `LARDER__DATABASE_URL`,
/// `LARDER__ENRICHMENT__API_KEY`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("LARDER_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, environment)).required(false))
        .add_source(Environment::with_prefix("LARDER").separator("__"))
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    Ok(app_config)
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("larder_api={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_unconfigured_by_default() {
        let cfg = EnrichmentConfig::default();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn enrichment_placeholder_key_counts_as_unconfigured() {
        let cfg = EnrichmentConfig {
            api_key: Some(UNCONFIGURED_API_KEY.to_string()),
            ..Default::default()
        };
        assert!(!cfg.is_configured());

        let cfg = EnrichmentConfig {
            api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!cfg.is_configured());
    }

    #[test]
    fn enrichment_real_key_is_configured() {
        let cfg = EnrichmentConfig {
            api_key: Some("sk-ant-test".to_string()),
            ..Default::default()
        };
        assert!(cfg.is_configured());
    }

    #[test]
    fn app_config_rejects_empty_database_url() {
        let cfg = AppConfig::new(String::new(), "127.0.0.1".into(), 8080, "test".into());
        assert!(cfg.validate().is_err());
    }
}
