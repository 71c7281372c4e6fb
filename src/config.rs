use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub static_data: StaticDataSettings,
    pub openai: OpenAiSettings,
    pub cache: CacheSettings,
    pub cooldown: CooldownSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticDataSettings {
    /// Origin serving /data/places-<city>.json and /data/vibes.json
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub l1_cache_size: Option<u64>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CooldownSettings {
    pub redis_url: String,
    pub window_secs: Option<u64>,
    pub threshold: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_fallback_slug")]
    pub fallback_slug: String,
    pub default_limit: Option<u16>,
    pub max_limit: Option<u16>,
}

fn default_city() -> String {
    "monterrey".to_string()
}

fn default_fallback_slug() -> String {
    "explorar".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,
    #[serde(default = "default_price_bonus")]
    pub price_bonus: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            rating: default_rating_weight(),
            similarity: default_similarity_weight(),
            price_bonus: default_price_bonus(),
        }
    }
}

fn default_rating_weight() -> f64 { 0.7 }
fn default_similarity_weight() -> f64 { 0.2 }
fn default_price_bonus() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with VIBRA_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with VIBRA_)
            // e.g., VIBRA_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("VIBRA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VIBRA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply overrides from the conventional bare environment variables
/// (REDIS_URL, OPENAI_API_KEY) that deployment platforms inject
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let redis_url = env::var("REDIS_URL")
        .or_else(|_| env::var("VIBRA_COOLDOWN__REDIS_URL"))
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let openai_api_key = env::var("OPENAI_API_KEY").ok();

    let mut builder = Config::builder()
        .add_source(settings)
        .set_override("cooldown.redis_url", redis_url)?;

    if let Some(api_key) = openai_api_key {
        builder = builder.set_override("openai.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.rating, 0.7);
        assert_eq!(weights.similarity, 0.2);
        assert_eq!(weights.price_bonus, 0.1);
    }

    #[test]
    fn test_default_matching_strings() {
        assert_eq!(default_city(), "monterrey");
        assert_eq!(default_fallback_slug(), "explorar");
    }

    #[test]
    fn test_default_logging() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "json");
    }
}
