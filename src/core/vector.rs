/// Number of semantic axes in the vibe space
pub const VIBE_AXES: usize = 6;

/// A point in the 6-dimensional vibe space.
///
/// Axis order is a contract: [Party, Chill, Culture, Romance, Outdoor,
/// Luxe]. Values are roughly unit-scale; individual axes may drift above
/// 1.0 during derivation until the sum cap rescales them.
pub type VibeVector = [f64; VIBE_AXES];

/// Named axis indices into a [`VibeVector`]
pub mod axis {
    /// Energy / fiesta
    pub const PARTY: usize = 0;
    /// Comfort / relax
    pub const CHILL: usize = 1;
    /// Gourmet / cultural
    pub const CULTURE: usize = 2;
    /// Intimacy / romántico
    pub const ROMANCE: usize = 3;
    /// Adventure / aventurero
    pub const OUTDOOR: usize = 4;
    /// Premium / luxe
    pub const LUXE: usize = 5;
}

/// Base vector for categories missing from the table.
///
/// Uniform low weight across the first five axes so unmapped categories
/// rank on rating rather than being zeroed out of similarity entirely.
pub const DEFAULT_CATEGORY_VECTOR: VibeVector = [0.2, 0.2, 0.2, 0.2, 0.2, 0.0];

/// Semantic priors for the dataset's place categories
pub const CATEGORY_VECTORS: [(&str, VibeVector); 12] = [
    ("Restaurante", [0.1, 0.3, 0.4, 0.2, 0.0, 0.3]),
    ("Café", [0.0, 0.5, 0.3, 0.1, 0.1, 0.1]),
    ("Bar y Cantina", [0.6, 0.2, 0.1, 0.1, 0.0, 0.2]),
    ("Club / Antro", [0.8, 0.0, 0.0, 0.0, 0.0, 0.2]),
    ("Rooftop / Terraza", [0.4, 0.3, 0.1, 0.2, 0.0, 0.4]),
    ("Mercado & Food Truck", [0.3, 0.2, 0.4, 0.0, 0.1, 0.0]),
    ("Boutique / Concept Store", [0.0, 0.1, 0.3, 0.1, 0.0, 0.5]),
    ("Belleza & Spa", [0.0, 0.7, 0.1, 0.2, 0.0, 0.4]),
    ("Arte & Cultura", [0.0, 0.2, 0.6, 0.1, 0.1, 0.2]),
    ("Librería & Papelería", [0.0, 0.4, 0.5, 0.1, 0.0, 0.1]),
    ("Parque / Outdoor", [0.1, 0.3, 0.1, 0.1, 0.4, 0.0]),
    ("Entretenimiento & Experiencia", [0.4, 0.2, 0.3, 0.1, 0.0, 0.2]),
];

/// Look up the base vector for a place category
#[inline]
pub fn category_base_vector(category: &str) -> VibeVector {
    CATEGORY_VECTORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, v)| *v)
        .unwrap_or(DEFAULT_CATEGORY_VECTOR)
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 on length mismatch or when either vector has zero
/// magnitude. That is a safe default, not a computed similarity: ranking
/// must keep working even against a corrupt catalog entry, so this never
/// divides by zero and never errors.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Scale a vector to unit magnitude; the zero vector is returned unchanged
#[inline]
pub fn normalize(v: VibeVector) -> VibeVector {
    let magnitude = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude == 0.0 {
        return v;
    }

    let mut out = v;
    for x in &mut out {
        *x /= magnitude;
    }
    out
}
