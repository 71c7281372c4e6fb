// Unit tests for Vibra Algo

use vibra_algo::core::{
    derive::derive_place_vector,
    resolver::nearest_vibe,
    vector::{axis, category_base_vector, cosine_similarity, normalize, VIBE_AXES},
};
use vibra_algo::models::{Place, PriceTier, ScoringWeights, VibeEntry};
use vibra_algo::services::cooldown::{decide, SlugState};
use vibra_algo::Ranker;

fn make_place(id: &str, category: &str, tags: &[&str], rating: f64, tier: PriceTier) -> Place {
    Place {
        id: id.to_string(),
        name: format!("Lugar {}", id),
        category: category.to_string(),
        description: "Un lugar de prueba".to_string(),
        coordinates: [25.6866, -100.3161],
        rating_score: rating,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        price_tier: tier,
    }
}

fn make_vibe(id: &str, vector: Vec<f64>, tags: &[&str]) -> VibeEntry {
    VibeEntry {
        id: id.to_string(),
        vector,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        description: String::new(),
    }
}

#[test]
fn test_cosine_identity_and_symmetry() {
    let a = [0.8, 0.1, 0.1, 0.0, 0.0, 0.1];
    let b = [0.0, 0.5, 0.3, 0.1, 0.1, 0.1];

    assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
}

#[test]
fn test_cosine_never_divides_by_zero() {
    let zero = [0.0; VIBE_AXES];
    let v = [0.3, 0.3, 0.0, 0.0, 0.0, 0.0];

    let sim = cosine_similarity(&zero, &v);
    assert_eq!(sim, 0.0);
    assert!(!sim.is_nan());
}

#[test]
fn test_cosine_length_mismatch_is_zero() {
    let six = [0.3, 0.3, 0.0, 0.0, 0.0, 0.0];
    let four = [0.3, 0.3, 0.0, 0.0];
    assert_eq!(cosine_similarity(&six, &four), 0.0);
}

#[test]
fn test_normalize_magnitude() {
    let v = normalize([2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(v, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    let zero = normalize([0.0; VIBE_AXES]);
    assert_eq!(zero, [0.0; VIBE_AXES]);
}

#[test]
fn test_derive_deterministic_across_calls() {
    let tags: Vec<String> = vec!["fiesta".to_string(), "dj".to_string()];
    let first = derive_place_vector("Bar y Cantina", &tags);

    for _ in 0..100 {
        assert_eq!(first, derive_place_vector("Bar y Cantina", &tags));
    }
}

#[test]
fn test_derive_unknown_category_not_zeroed() {
    let v = derive_place_vector("Categoría Nueva", &[]);
    assert!(v.iter().take(5).all(|x| *x > 0.0), "fallback axes must carry weight");
}

#[test]
fn test_category_table_covers_known_categories() {
    let club = category_base_vector("Club / Antro");
    assert_eq!(club[axis::PARTY], 0.8);

    let spa = category_base_vector("Belleza & Spa");
    assert_eq!(spa[axis::CHILL], 0.7);
}

#[test]
fn test_bar_beats_cafe_for_fiesta_vibe() {
    let vibe = make_vibe("fiesta-total", vec![0.8, 0.1, 0.1, 0.0, 0.0, 0.1], &["fiesta"]);

    let bar_vector = derive_place_vector("Bar y Cantina", &["fiesta".to_string(), "dj".to_string()]);
    let cafe_vector = derive_place_vector("Café", &["tranquilo".to_string()]);

    let bar_similarity = cosine_similarity(&bar_vector, &vibe.vector);
    let cafe_similarity = cosine_similarity(&cafe_vector, &vibe.vector);

    assert!(
        bar_similarity > cafe_similarity,
        "bar ({}) should be more similar than cafe ({})",
        bar_similarity,
        cafe_similarity
    );
}

#[test]
fn test_score_formula_top_rating_accessible_price() {
    let ranker = Ranker::with_default_weights();
    let vibe = make_vibe("fiesta-total", vec![0.8, 0.1, 0.1, 0.0, 0.0, 0.1], &["fiesta"]);
    let place = make_place("1", "Bar y Cantina", &["fiesta"], 5.0, PriceTier::Budget);

    let similarity = cosine_similarity(
        &derive_place_vector(&place.category, &place.tags),
        &vibe.vector,
    );

    let expected = 0.7 + 0.2 * similarity + 0.1;
    assert!((ranker.score(&place, &vibe) - expected).abs() < 1e-9);
}

#[test]
fn test_custom_weights_respected() {
    let ranker = Ranker::new(ScoringWeights {
        rating: 1.0,
        similarity: 0.0,
        price_bonus: 0.0,
    });
    let vibe = make_vibe("fiesta-total", vec![0.8, 0.1, 0.1, 0.0, 0.0, 0.1], &[]);
    let place = make_place("1", "Café", &[], 3.0, PriceTier::Budget);

    // rating_norm = (3 - 1) / 4 = 0.5, everything else weighted to zero
    assert!((ranker.score(&place, &vibe) - 0.5).abs() < 1e-9);
}

#[test]
fn test_rank_empty_returns_empty() {
    let ranker = Ranker::with_default_weights();
    let vibe = make_vibe("fiesta-total", vec![0.8, 0.1, 0.1, 0.0, 0.0, 0.1], &["fiesta"]);

    let outcome = ranker.rank(vec![], &vibe, "fiesta");
    assert!(outcome.places.is_empty());
}

#[test]
fn test_rank_fallback_never_shrinks_output() {
    let ranker = Ranker::with_default_weights();
    let vibe = make_vibe("fiesta-total", vec![0.8, 0.1, 0.1, 0.0, 0.0, 0.1], &["fiesta"]);

    let places = vec![
        make_place("1", "Café", &["lectura"], 4.0, PriceTier::Moderate),
        make_place("2", "Librería & Papelería", &["libros"], 4.3, PriceTier::Budget),
        make_place("3", "Belleza & Spa", &["masaje"], 4.8, PriceTier::Luxury),
    ];

    let outcome = ranker.rank(places.clone(), &vibe, "fiesta");
    assert_eq!(outcome.places.len(), places.len());
    assert_eq!(outcome.tag_matches, 0);
}

#[test]
fn test_nearest_vibe_scan() {
    let catalog = vec![
        make_vibe("zen-minimal", vec![0.0, 0.8, 0.1, 0.1, 0.0, 0.0], &[]),
        make_vibe("chaos-fiesta", vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.1], &[]),
        make_vibe("neo-bolero", vec![0.1, 0.2, 0.3, 0.5, 0.0, 0.1], &[]),
    ];

    assert_eq!(
        nearest_vibe(&[0.0, 0.1, 0.3, 0.6, 0.0, 0.0], &catalog, "explorar"),
        "neo-bolero"
    );
    assert_eq!(nearest_vibe(&[0.2; 6], &[], "explorar"), "explorar");
}

#[test]
fn test_cooldown_decision_sequence() {
    // Five observations with threshold 5: 1-4 keep counting, 5 promotes
    for call in 1..=4u64 {
        assert_eq!(decide(call, 5), SlugState::Counting(call));
    }
    assert_eq!(decide(5, 5), SlugState::Promoted);
}
