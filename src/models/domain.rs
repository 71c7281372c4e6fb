use serde::{Deserialize, Serialize};

/// Cities with a published place dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum City {
    Monterrey,
    Guadalajara,
    Cdmx,
    Guanajuato,
    Cdvictoria,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Monterrey,
        City::Guadalajara,
        City::Cdmx,
        City::Guanajuato,
        City::Cdvictoria,
    ];

    /// Key used in dataset file names (places-<key>.json)
    pub fn dataset_key(&self) -> &'static str {
        match self {
            City::Monterrey => "monterrey",
            City::Guadalajara => "guadalajara",
            City::Cdmx => "cdmx",
            City::Guanajuato => "guanajuato",
            City::Cdvictoria => "cdvictoria",
        }
    }

    pub fn parse(s: &str) -> Option<City> {
        let key = s.trim().to_lowercase();
        City::ALL.iter().copied().find(|c| c.dataset_key() == key)
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dataset_key())
    }
}

/// Price tier of a place, from cheapest to most expensive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Upscale,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceTier {
    pub fn parse(s: &str) -> Option<PriceTier> {
        match s.trim() {
            "$" => Some(PriceTier::Budget),
            "$$" => Some(PriceTier::Moderate),
            "$$$" => Some(PriceTier::Upscale),
            "$$$$" => Some(PriceTier::Luxury),
            _ => None,
        }
    }

    /// Budget and moderate tiers qualify for the accessibility bonus
    pub fn accessible(&self) -> bool {
        matches!(self, PriceTier::Budget | PriceTier::Moderate)
    }
}

impl Default for PriceTier {
    fn default() -> Self {
        PriceTier::Moderate
    }
}

/// Canonical place record, produced by normalizing a raw dataset entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub coordinates: [f64; 2],
    #[serde(rename = "ratingScore")]
    pub rating_score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "priceTier", default)]
    pub price_tier: PriceTier,
}

/// Raw place entry as it appears in the per-city dataset files.
///
/// Datasets carry Spanish and English field names interchangeably
/// (nombre/name, categoría/category, playlists/tags, ...). Normalization
/// happens once here, at the loading boundary; the rest of the service
/// only ever sees `Place`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "categoría")]
    pub categoria: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "descripción_corta")]
    pub descripcion_corta: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub rank_score: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub playlists: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub rango_precios: Option<String>,
}

impl RawPlace {
    /// Collapse aliased fields into the canonical shape.
    ///
    /// Spanish names take precedence (the curated datasets use them);
    /// missing ratings default to 4.0 and missing price tiers to "$$".
    pub fn normalize(self) -> Place {
        let id = match self.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let coordinates = self
            .coordinates
            .unwrap_or([self.lat.unwrap_or(0.0), self.lng.unwrap_or(0.0)]);

        Place {
            id,
            name: self.nombre.or(self.name).unwrap_or_default(),
            category: self.categoria.or(self.category).unwrap_or_default(),
            description: self
                .descripcion_corta
                .or(self.description)
                .unwrap_or_default(),
            coordinates,
            rating_score: self.rank_score.or(self.rating).unwrap_or(4.0),
            tags: self.playlists.or(self.tags).unwrap_or_default(),
            price_tier: self
                .rango_precios
                .as_deref()
                .and_then(PriceTier::parse)
                .unwrap_or_default(),
        }
    }
}

/// Entry in the vibe catalog
///
/// The catalog is loaded once and append-only; iteration order is the
/// load order, which nearest-vibe resolution depends on for stable
/// tie-breaks. The vector stays a Vec so a corrupt entry with the wrong
/// arity degrades to zero similarity instead of failing the whole load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibeEntry {
    pub id: String,
    #[serde(rename = "v")]
    pub vector: Vec<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "desc", alias = "description")]
    pub description: String,
}

impl VibeEntry {
    /// Luxe-axis weight, 0.0 when the stored vector is malformed
    pub fn luxe(&self) -> f64 {
        self.vector
            .get(crate::core::vector::axis::LUXE)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Query intent extracted from the user's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Spot,
    Route,
}

impl Default for Intent {
    fn default() -> Self {
        Intent::Spot
    }
}

/// AI-written article for a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

/// Scoring weights for the ranking formula
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub rating: f64,
    pub similarity: f64,
    pub price_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rating: 0.7,
            similarity: 0.2,
            price_bonus: 0.1,
        }
    }
}
