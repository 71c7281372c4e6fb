use crate::core::vector::cosine_similarity;
use crate::models::VibeEntry;

/// Find the catalog slug closest to a target vector.
///
/// Linear scan; only a strictly greater similarity replaces the current
/// best, so on ties the first entry in catalog order wins. Catalog load
/// order must be preserved by callers for reproducible results. An empty
/// catalog yields the fallback slug, never an error.
pub fn nearest_vibe<'a>(target: &[f64], catalog: &'a [VibeEntry], fallback: &'a str) -> &'a str {
    let mut best: Option<(&'a str, f64)> = None;

    for entry in catalog {
        let similarity = cosine_similarity(target, &entry.vector);
        match best {
            Some((_, best_similarity)) if similarity <= best_similarity => {}
            _ => best = Some((entry.id.as_str(), similarity)),
        }
    }

    best.map(|(slug, _)| slug).unwrap_or(fallback)
}
