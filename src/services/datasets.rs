use crate::models::{City, Place, RawPlace, VibeEntry};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const VIBES_CACHE_KEY: &str = "vibes";

/// Errors that can occur when loading static datasets
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Origin returned error: {0}")]
    OriginError(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Static-data provider for place datasets and the vibe catalog.
///
/// Fetches JSON files from the configured origin and keeps them in an
/// in-memory read-through cache with a TTL. Failures degrade to empty
/// sequences at the public API so callers always receive something
/// rankable; the cache is only populated on success so a later request
/// retries the origin.
pub struct DatasetService {
    base_url: String,
    client: Client,
    places_cache: moka::future::Cache<City, Arc<Vec<Place>>>,
    vibes_cache: moka::future::Cache<&'static str, Arc<Vec<VibeEntry>>>,
}

impl DatasetService {
    pub fn new(base_url: String, cache_size: u64, ttl_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        let places_cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        let vibes_cache = moka::future::CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            base_url,
            client,
            places_cache,
            vibes_cache,
        }
    }

    /// Load the place dataset for a city.
    ///
    /// Never fails from the caller's perspective: an unreachable origin or
    /// malformed payload logs a warning and returns an empty set.
    pub async fn load_places(&self, city: City) -> Arc<Vec<Place>> {
        if let Some(cached) = self.places_cache.get(&city).await {
            tracing::trace!("Places cache hit: {}", city);
            return cached;
        }

        match self.fetch_places(city).await {
            Ok(places) => {
                tracing::debug!("Loaded {} places for {}", places.len(), city);
                let places = Arc::new(places);
                self.places_cache.insert(city, places.clone()).await;
                places
            }
            Err(e) => {
                tracing::warn!("Failed to load places for {}: {}, serving empty set", city, e);
                Arc::new(Vec::new())
            }
        }
    }

    /// Load the vibe catalog, preserving the file's entry order
    pub async fn load_vibes(&self) -> Arc<Vec<VibeEntry>> {
        if let Some(cached) = self.vibes_cache.get(&VIBES_CACHE_KEY).await {
            tracing::trace!("Vibes cache hit");
            return cached;
        }

        match self.fetch_vibes().await {
            Ok(vibes) => {
                tracing::debug!("Loaded {} vibes", vibes.len());
                let vibes = Arc::new(vibes);
                self.vibes_cache.insert(VIBES_CACHE_KEY, vibes.clone()).await;
                vibes
            }
            Err(e) => {
                tracing::warn!("Failed to load vibe catalog: {}, serving empty catalog", e);
                Arc::new(Vec::new())
            }
        }
    }

    /// Drop the cached dataset for one city
    pub async fn invalidate_city(&self, city: City) {
        self.places_cache.invalidate(&city).await;
    }

    /// Drop everything cached; the next load refetches from the origin
    pub fn invalidate_all(&self) {
        self.places_cache.invalidate_all();
        self.vibes_cache.invalidate_all();
        tracing::debug!("Invalidated dataset caches");
    }

    async fn fetch_places(&self, city: City) -> Result<Vec<Place>, DatasetError> {
        let url = format!(
            "{}/data/places-{}.json",
            self.base_url.trim_end_matches('/'),
            city.dataset_key()
        );

        tracing::debug!("Fetching places from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DatasetError::OriginError(format!(
                "places fetch returned {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let raw = json
            .get("lugares")
            .and_then(|l| l.as_array())
            .ok_or_else(|| DatasetError::InvalidPayload("missing lugares array".into()))?;

        // Lenient per-record parsing: a broken entry is dropped, not fatal
        let places: Vec<Place> = raw
            .iter()
            .filter_map(|doc| serde_json::from_value::<RawPlace>(doc.clone()).ok())
            .map(RawPlace::normalize)
            .collect();

        Ok(places)
    }

    async fn fetch_vibes(&self) -> Result<Vec<VibeEntry>, DatasetError> {
        let url = format!("{}/data/vibes.json", self.base_url.trim_end_matches('/'));

        tracing::debug!("Fetching vibes from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DatasetError::OriginError(format!(
                "vibes fetch returned {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        // The catalog ships either as a bare array or wrapped in { vibes: [...] }
        let raw = if let Some(array) = json.as_array() {
            array
        } else {
            json.get("vibes")
                .and_then(|v| v.as_array())
                .ok_or_else(|| DatasetError::InvalidPayload("missing vibes array".into()))?
        };

        let vibes: Vec<VibeEntry> = raw
            .iter()
            .filter_map(|doc| serde_json::from_value(doc.clone()).ok())
            .collect();

        Ok(vibes)
    }
}

/// Case-insensitive catalog lookup by slug
pub fn find_vibe<'a>(vibes: &'a [VibeEntry], slug: &str) -> Option<&'a VibeEntry> {
    vibes.iter().find(|vibe| vibe.id.eq_ignore_ascii_case(slug))
}
