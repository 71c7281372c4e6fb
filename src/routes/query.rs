use crate::core::{derive_place_vector, nearest_vibe, Ranker};
use crate::models::{
    City, ErrorResponse, HealthResponse, QueryRequest, QueryResponse, RandomRouteRequest,
    RouteResponse, VibeEntry,
};
use crate::services::{find_vibe, CooldownDecision, CooldownGate, DatasetService, LlmClient};
use actix_web::{web, HttpResponse, Responder};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<DatasetService>,
    pub llm: Arc<LlmClient>,
    pub gate: Arc<CooldownGate>,
    pub ranker: Ranker,
    pub default_city: City,
    pub fallback_slug: String,
    pub max_limit: u16,
}

/// Configure all query-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/query", web::post().to(query))
        .route("/route/random", web::post().to(random_route))
        .route("/route/random", web::get().to(random_route_get))
        .route("/vibes/resolve", web::get().to(resolve_vibe));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.gate.store_available() {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Main query endpoint
///
/// POST /api/v1/query
///
/// Request body:
/// ```json
/// {
///   "text": "algo tranquilo en monterrey",
///   "limit": 10
/// }
/// ```
async fn query(state: web::Data<AppState>, req: web::Json<QueryRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let limit = req.limit.min(state.max_limit) as usize;

    // Stage 1: parse the free text (LLM with deterministic fallback)
    let parsed = state.llm.parse_query(&req.text).await;
    let raw_slug = parsed.vibe_slug.clone();

    tracing::info!("Query parsed: city={}, slug={}, intent={:?}", parsed.city, raw_slug, parsed.intent);

    let vibes = state.datasets.load_vibes().await;

    // A slug that is not in the catalog gets a vector derived from the slug
    // itself, treated as a tag; that vector drives both nearest-vibe
    // aliasing and the pending record on promotion.
    let target = derive_place_vector("", std::slice::from_ref(&raw_slug));

    // Stage 2: admission gate for unrecognized slugs
    let (vibe, slug, vibe_status) = match find_vibe(&vibes, &raw_slug) {
        Some(known) => (known.clone(), raw_slug.clone(), "known"),
        None => {
            let decision = state
                .gate
                .check(
                    &raw_slug,
                    &target,
                    std::slice::from_ref(&raw_slug),
                    &req.text,
                    &vibes,
                    &state.fallback_slug,
                )
                .await;

            match decision {
                CooldownDecision::Promoted { slug } => {
                    let pending = VibeEntry {
                        id: slug.clone(),
                        vector: target.to_vec(),
                        tags: vec![slug.clone()],
                        description: req.text.clone(),
                    };
                    (pending, slug, "pending_created")
                }
                CooldownDecision::Alias { nearest_slug } => match find_vibe(&vibes, &nearest_slug) {
                    Some(aliased) => (aliased.clone(), nearest_slug, "alias_existing"),
                    None => {
                        // Empty or unreachable catalog: rank against the
                        // derived vector under the fallback slug
                        let fallback = VibeEntry {
                            id: nearest_slug.clone(),
                            vector: target.to_vec(),
                            tags: vec![raw_slug.clone()],
                            description: String::new(),
                        };
                        (fallback, nearest_slug, "alias_existing")
                    }
                },
            }
        }
    };

    // Stage 3: load and rank
    let places = state.datasets.load_places(parsed.city).await;
    let outcome = state.ranker.rank((*places).clone(), &vibe, &raw_slug);

    tracing::info!(
        "Ranked {} places for slug '{}' ({} tag matches of {} candidates)",
        outcome.places.len(),
        slug,
        outcome.tag_matches,
        outcome.total_candidates
    );

    let mut ranked = outcome.places;
    ranked.truncate(limit);

    // Stage 4: decorate the top result; ranking never waits on copy
    let tagline = match ranked.first() {
        Some(top) => Some(state.llm.generate_tagline(top, &slug).await),
        None => None,
    };

    HttpResponse::Ok().json(QueryResponse {
        city: parsed.city,
        slug,
        vibe_status: vibe_status.to_string(),
        intent: parsed.intent,
        places: ranked,
        tagline,
        total_candidates: outcome.total_candidates,
    })
}

/// Random route endpoint
///
/// POST /api/v1/route/random
///
/// Request body:
/// ```json
/// {
///   "city": "monterrey",
///   "vibe": "explorar"
/// }
/// ```
async fn random_route(
    state: web::Data<AppState>,
    req: web::Json<RandomRouteRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let Some(city) = City::parse(&req.city) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Unknown city".to_string(),
            message: format!("City must be one of: {}", city_list()),
            status_code: 400,
        });
    };

    let vibe = req
        .vibe
        .clone()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.fallback_slug.clone());

    build_random_route(&state, city, &vibe).await
}

/// GET variant with query parameters, defaults applied
async fn random_route_get(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let city = query
        .get("city")
        .and_then(|c| City::parse(c))
        .unwrap_or(state.default_city);
    let vibe = query
        .get("vibe")
        .cloned()
        .unwrap_or_else(|| state.fallback_slug.clone());

    build_random_route(&state, city, &vibe).await
}

async fn build_random_route(state: &AppState, city: City, vibe: &str) -> HttpResponse {
    let places = state.datasets.load_places(city).await;

    if places.is_empty() {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "No places found".to_string(),
            message: format!("No places found for {}", city),
            status_code: 404,
        });
    }

    // Scope the rng so it does not live across an await point
    let (selected, slug) = {
        let mut rng = rand::thread_rng();
        let selected: Vec<_> = places.choose_multiple(&mut rng, 3).cloned().collect();
        (selected, generate_route_slug(&mut rng))
    };

    let article = state.llm.generate_article(&selected, vibe).await;

    tracing::info!("Built random route '{}' with {} places in {}", slug, selected.len(), city);

    HttpResponse::Ok().json(RouteResponse {
        slug,
        city,
        vibe: vibe.to_string(),
        places: selected,
        article,
    })
}

/// Debug endpoint: resolve an arbitrary slug to the nearest catalog vibe
///
/// GET /api/v1/vibes/resolve?slug={slug}
async fn resolve_vibe(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let slug = match query.get("slug") {
        Some(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing slug parameter".to_string(),
                message: "slug query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    let vibes = state.datasets.load_vibes().await;
    let target = derive_place_vector("", std::slice::from_ref(&slug));
    let nearest = nearest_vibe(&target, &vibes, &state.fallback_slug);

    HttpResponse::Ok().json(serde_json::json!({
        "slug": slug,
        "nearestSlug": nearest,
        "catalogSize": vibes.len(),
    }))
}

fn city_list() -> String {
    City::ALL
        .iter()
        .map(|c| c.dataset_key())
        .collect::<Vec<_>>()
        .join(", ")
}

fn generate_route_slug<R: Rng>(rng: &mut R) -> String {
    const ADJECTIVES: [&str; 6] = ["epic", "cool", "wild", "fresh", "sick", "mad"];
    const NOUNS: [&str; 5] = ["ruta", "viaje", "tour", "spot", "aventura"];

    let adjective = ADJECTIVES.choose(rng).unwrap_or(&ADJECTIVES[0]);
    let noun = NOUNS.choose(rng).unwrap_or(&NOUNS[0]);
    let number: u16 = rng.gen_range(0..999);

    format!("{}-{}-{}", adjective, noun, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_slug_shape() {
        let mut rng = rand::thread_rng();
        let slug = generate_route_slug(&mut rng);
        let parts: Vec<&str> = slug.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[2].parse::<u16>().unwrap() < 999);
    }

    #[test]
    fn test_health_response_shape() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(response.status, "healthy");
    }
}
