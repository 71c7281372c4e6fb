use crate::models::domain::{Article, City, Intent, Place};
use serde::{Deserialize, Serialize};

/// Response for the query endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub city: City,
    pub slug: String,
    #[serde(rename = "vibeStatus")]
    pub vibe_status: String,
    pub intent: Intent,
    pub places: Vec<Place>,
    pub tagline: Option<String>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the random route endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub slug: String,
    pub city: City,
    pub vibe: String,
    pub places: Vec<Place>,
    pub article: Article,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
