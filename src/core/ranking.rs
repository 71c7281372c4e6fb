use crate::core::derive::derive_place_vector;
use crate::core::vector::cosine_similarity;
use crate::models::{Place, ScoringWeights, VibeEntry};

/// Luxe weight below which accessible price tiers earn the bonus
const LUXE_BONUS_CUTOFF: f64 = 0.3;

/// Scores closer than this are treated as tied
const SCORE_TIE_WINDOW: f64 = 0.01;

/// Result of a ranking pass
#[derive(Debug)]
pub struct RankOutcome {
    /// Places in descending score order; scores themselves are transient
    /// and dropped once the order is fixed.
    pub places: Vec<Place>,
    pub total_candidates: usize,
    /// How many candidates survived the hard tag filter (0 means the
    /// fallback to the full set was taken)
    pub tag_matches: usize,
}

/// Ranking engine for vibe queries
///
/// # Pipeline
/// 1. Hard tag filter against the raw slug and the vibe's tags, with a
///    fallback to the full candidate set when nothing matches
/// 2. Score each candidate from its rating, vibe similarity and an
///    accessibility price bonus
/// 3. Sort descending; near-ties resolve by place id so the order is
///    reproducible across calls
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Rank places for a vibe.
    ///
    /// Total for all inputs: an empty candidate set returns an empty
    /// outcome and a filter that matches nothing degrades to ranking the
    /// whole input rather than returning zero results.
    pub fn rank(&self, places: Vec<Place>, vibe: &VibeEntry, raw_slug: &str) -> RankOutcome {
        let total_candidates = places.len();

        // Stage 1: hard tag filter, full set as fallback
        let (matched, rest): (Vec<Place>, Vec<Place>) = places
            .into_iter()
            .partition(|place| matches_vibe_tags(place, vibe, raw_slug));

        let tag_matches = matched.len();
        let pool = if matched.is_empty() { rest } else { matched };

        // Stage 2: score
        let mut scored: Vec<(f64, Place)> = pool
            .into_iter()
            .map(|place| (self.score(&place, vibe), place))
            .collect();

        // Stage 3: order. Scores are quantized to the tie window before
        // comparing, so candidates within 0.01 of each other fall into the
        // same bucket and order by ascending place id. The comparator stays
        // a total order and repeated calls give identical output.
        scored.sort_by(|a, b| {
            score_bucket(b.0)
                .cmp(&score_bucket(a.0))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });

        RankOutcome {
            places: scored.into_iter().map(|(_, place)| place).collect(),
            total_candidates,
            tag_matches,
        }
    }

    /// Score a single place against a vibe.
    ///
    /// score = rating_weight * rating_norm
    ///       + similarity_weight * cosine(place vector, vibe vector)
    ///       + price bonus for accessible tiers on non-luxe vibes
    pub fn score(&self, place: &Place, vibe: &VibeEntry) -> f64 {
        let rating_norm = ((place.rating_score - 1.0) / 4.0).clamp(0.0, 1.0);

        let place_vector = derive_place_vector(&place.category, &place.tags);
        let similarity = cosine_similarity(&place_vector, &vibe.vector);

        let price_bonus = if place.price_tier.accessible() && vibe.luxe() < LUXE_BONUS_CUTOFF {
            self.weights.price_bonus
        } else {
            0.0
        };

        self.weights.rating * rating_norm + self.weights.similarity * similarity + price_bonus
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[inline]
fn score_bucket(score: f64) -> i64 {
    (score / SCORE_TIE_WINDOW).round() as i64
}

/// Hard filter: at least one place tag contains the raw slug, or overlaps
/// one of the vibe's tags in either containment direction.
#[inline]
fn matches_vibe_tags(place: &Place, vibe: &VibeEntry, raw_slug: &str) -> bool {
    let slug = raw_slug.to_lowercase();

    place.tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        if tag.contains(&slug) {
            return true;
        }
        vibe.tags.iter().any(|vibe_tag| {
            let vibe_tag = vibe_tag.to_lowercase();
            tag.contains(&vibe_tag) || vibe_tag.contains(&tag)
        })
    })
}
