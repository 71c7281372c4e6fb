use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request for the main query endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
}

fn default_limit() -> u16 {
    10
}

/// Request for a randomly assembled route
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RandomRouteRequest {
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(default)]
    pub vibe: Option<String>,
}
