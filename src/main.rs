mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::Ranker;
use crate::models::{City, ScoringWeights};
use crate::routes::query::AppState;
use crate::services::{CooldownGate, CounterStore, DatasetService, LlmClient};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Vibra Algo recommendation service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize dataset provider with its read-through cache
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(16);

    let datasets = Arc::new(DatasetService::new(
        settings.static_data.base_url.clone(),
        l1_cache_size,
        cache_ttl,
    ));

    info!("Dataset service initialized (origin: {}, TTL: {}s)", settings.static_data.base_url, cache_ttl);

    // Initialize the cooldown gate; a dead Redis degrades the gate to
    // alias-only instead of refusing to start, since every gate decision
    // has a defined fallback
    let window_secs = settings.cooldown.window_secs.unwrap_or(services::cooldown::DEFAULT_WINDOW_SECS);
    let threshold = settings.cooldown.threshold.unwrap_or(services::cooldown::DEFAULT_THRESHOLD);

    let gate = match CounterStore::connect(&settings.cooldown.redis_url).await {
        Ok(store) => {
            info!("Counter store connected (window: {}s, threshold: {})", window_secs, threshold);
            Arc::new(CooldownGate::new(Some(store), window_secs, threshold))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), admission gate degraded to alias-only", e);
            Arc::new(CooldownGate::new(None, window_secs, threshold))
        }
    };

    // Initialize LLM client
    let default_city = City::parse(&settings.matching.default_city).unwrap_or(City::Monterrey);

    let llm = Arc::new(LlmClient::new(
        settings.openai.base_url.clone(),
        settings.openai.api_key.clone(),
        settings.openai.model.clone(),
        default_city,
    ));

    info!("LLM client initialized (model: {})", settings.openai.model);

    // Initialize ranker with configured weights
    let weights = ScoringWeights {
        rating: settings.scoring.weights.rating,
        similarity: settings.scoring.weights.similarity,
        price_bonus: settings.scoring.weights.price_bonus,
    };

    let ranker = Ranker::new(weights);

    info!("Ranker initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        datasets,
        llm,
        gate,
        ranker,
        default_city,
        fallback_slug: settings.matching.fallback_slug.clone(),
        max_limit: settings.matching.max_limit.unwrap_or(50),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
