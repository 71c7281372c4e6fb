// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Article, City, Intent, Place, PriceTier, RawPlace, ScoringWeights, VibeEntry};
pub use requests::{QueryRequest, RandomRouteRequest};
pub use responses::{ErrorResponse, HealthResponse, QueryResponse, RouteResponse};
