use crate::core::resolver::nearest_vibe;
use crate::models::VibeEntry;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use thiserror::Error;

/// Window length for counting hits on an unrecognized slug (24 hours)
pub const DEFAULT_WINDOW_SECS: u64 = 86_400;

/// Hits within the window before a slug is promoted to a pending vibe
pub const DEFAULT_THRESHOLD: u64 = 5;

/// Errors that can occur with the counter store
#[derive(Debug, Error)]
pub enum CooldownError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Counter store unavailable")]
    Unavailable,
}

/// Counter store over Redis.
///
/// The admission gate depends on exactly four primitives: atomic
/// increment, expiry arming, hash record writes and deletion. INCR is
/// atomic on the server, so two concurrent requests can never both read
/// the same count.
pub struct CounterStore {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
}

impl CounterStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CooldownError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
        })
    }

    /// Atomically increment a counter, returning the new value
    pub async fn increment(&self, key: &str) -> Result<u64, CooldownError> {
        let mut conn = self.redis.lock().await;
        let count: u64 = redis::cmd("INCR").arg(key).query_async(&mut *conn).await?;
        Ok(count)
    }

    /// Arm a time-to-live on a key
    pub async fn set_expiry(&self, key: &str, ttl_secs: u64) -> Result<(), CooldownError> {
        let mut conn = self.redis.lock().await;
        redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }

    /// Write a field/value record under a key
    pub async fn write_record(&self, key: &str, fields: &[(String, String)]) -> Result<(), CooldownError> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }

        let mut conn = self.redis.lock().await;
        cmd.query_async::<()>(&mut *conn).await?;
        Ok(())
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<(), CooldownError> {
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await?;
        Ok(())
    }
}

/// Key builder for the counter store
pub struct CooldownKey;

impl CooldownKey {
    /// Hit counter for an unrecognized slug
    pub fn hits(slug: &str) -> String {
        format!("hits:{}", slug)
    }

    /// Pending-vibe record written on promotion
    pub fn pending(slug: &str) -> String {
        format!("pending:{}", slug)
    }
}

/// Where a slug stands within the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugState {
    Counting(u64),
    Promoted,
}

/// Threshold decision, separated from I/O so it can be tested without Redis
#[inline]
pub fn decide(count: u64, threshold: u64) -> SlugState {
    if count >= threshold {
        SlugState::Promoted
    } else {
        SlugState::Counting(count)
    }
}

/// Outcome of running a slug through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CooldownDecision {
    /// The slug crossed the threshold; a pending-vibe record now exists
    /// and the raw slug may be used as-is
    Promoted { slug: String },
    /// Still cooling down (or the store is unreachable); use the nearest
    /// catalog vibe instead
    Alias { nearest_slug: String },
}

/// Admission gate for unrecognized vibe slugs.
///
/// Per slug the gate moves absent -> counting -> promoted: the first hit
/// starts a counter with a TTL, each further hit within the window
/// increments it, and the threshold hit deletes the counter and writes a
/// pending-vibe record. Window expiry is Redis key expiry, so a late hit
/// simply restarts the count at 1. Every non-promoting call (including
/// any store failure) aliases to the nearest catalog vibe.
pub struct CooldownGate {
    store: Option<CounterStore>,
    window_secs: u64,
    threshold: u64,
}

impl CooldownGate {
    pub fn new(store: Option<CounterStore>, window_secs: u64, threshold: u64) -> Self {
        Self {
            store,
            window_secs,
            threshold,
        }
    }

    /// False when running degraded without a counter store
    pub fn store_available(&self) -> bool {
        self.store.is_some()
    }

    /// Run one observation of `slug` through the gate
    pub async fn check(
        &self,
        slug: &str,
        target: &[f64],
        tags: &[String],
        description: &str,
        catalog: &[VibeEntry],
        fallback_slug: &str,
    ) -> CooldownDecision {
        match self.try_check(slug, target, tags, description).await {
            Ok(Some(decision)) => decision,
            Ok(None) => CooldownDecision::Alias {
                nearest_slug: nearest_vibe(target, catalog, fallback_slug).to_string(),
            },
            Err(e) => {
                tracing::warn!("Cooldown check failed for '{}': {}, aliasing to nearest vibe", slug, e);
                CooldownDecision::Alias {
                    nearest_slug: nearest_vibe(target, catalog, fallback_slug).to_string(),
                }
            }
        }
    }

    /// Returns Ok(Some(Promoted)) on threshold, Ok(None) while counting
    async fn try_check(
        &self,
        slug: &str,
        target: &[f64],
        tags: &[String],
        description: &str,
    ) -> Result<Option<CooldownDecision>, CooldownError> {
        let store = self.store.as_ref().ok_or(CooldownError::Unavailable)?;

        let key = CooldownKey::hits(slug);
        let count = store.increment(&key).await?;

        // Arm the window on the first hit only; later hits ride the
        // original TTL so the window does not slide.
        if count == 1 {
            store.set_expiry(&key, self.window_secs).await?;
        }

        match decide(count, self.threshold) {
            SlugState::Promoted => {
                tracing::info!("Slug '{}' reached {} hits, promoting to pending vibe", slug, count);
                store.delete(&key).await?;
                store
                    .write_record(&CooldownKey::pending(slug), &pending_fields(target, tags, description))
                    .await?;
                Ok(Some(CooldownDecision::Promoted {
                    slug: slug.to_string(),
                }))
            }
            SlugState::Counting(n) => {
                tracing::debug!("Slug '{}' cooling down: {}/{} hits", slug, n, self.threshold);
                Ok(None)
            }
        }
    }
}

fn pending_fields(target: &[f64], tags: &[String], description: &str) -> Vec<(String, String)> {
    vec![
        ("id".to_string(), uuid::Uuid::new_v4().to_string()),
        (
            "vector".to_string(),
            serde_json::to_string(target).unwrap_or_else(|_| "[]".to_string()),
        ),
        (
            "tags".to_string(),
            serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string()),
        ),
        ("description".to_string(), description.to_string()),
        ("requestedAt".to_string(), chrono::Utc::now().to_rfc3339()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f64>) -> VibeEntry {
        VibeEntry {
            id: id.to_string(),
            vector,
            tags: vec![],
            description: String::new(),
        }
    }

    #[test]
    fn test_decide_counts_below_threshold() {
        for n in 1..5 {
            assert_eq!(decide(n, 5), SlugState::Counting(n));
        }
    }

    #[test]
    fn test_decide_promotes_at_threshold() {
        assert_eq!(decide(5, 5), SlugState::Promoted);
        assert_eq!(decide(6, 5), SlugState::Promoted);
    }

    #[test]
    fn test_key_builder() {
        assert_eq!(CooldownKey::hits("neo-bolero"), "hits:neo-bolero");
        assert_eq!(CooldownKey::pending("neo-bolero"), "pending:neo-bolero");
    }

    #[tokio::test]
    async fn test_gate_without_store_aliases_to_nearest() {
        let gate = CooldownGate::new(None, DEFAULT_WINDOW_SECS, DEFAULT_THRESHOLD);
        let catalog = vec![
            entry("zen-minimal", vec![0.0, 0.8, 0.1, 0.1, 0.0, 0.0]),
            entry("chaos-fiesta", vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.1]),
        ];

        let target = [0.8, 0.1, 0.0, 0.0, 0.0, 0.1];
        let decision = gate
            .check("fiesta-rara", &target, &[], "", &catalog, "explorar")
            .await;

        assert_eq!(
            decision,
            CooldownDecision::Alias {
                nearest_slug: "chaos-fiesta".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_gate_without_store_and_empty_catalog_uses_fallback() {
        let gate = CooldownGate::new(None, DEFAULT_WINDOW_SECS, DEFAULT_THRESHOLD);
        let decision = gate.check("lo-que-sea", &[0.1; 6], &[], "", &[], "explorar").await;

        assert_eq!(
            decision,
            CooldownDecision::Alias {
                nearest_slug: "explorar".to_string()
            }
        );
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_gate_promotes_on_fifth_hit() {
        let store = CounterStore::connect("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");
        let slug = format!("test-vibe-{}", uuid::Uuid::new_v4());

        let gate = CooldownGate::new(Some(store), 60, 5);
        let catalog = vec![entry("chaos-fiesta", vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.1])];

        for expected in 1..5u64 {
            let decision = gate
                .check(&slug, &[0.5; 6], &[], "", &catalog, "explorar")
                .await;
            assert!(
                matches!(decision, CooldownDecision::Alias { .. }),
                "hit {} should still alias",
                expected
            );
        }

        let decision = gate
            .check(&slug, &[0.5; 6], &[], "", &catalog, "explorar")
            .await;
        assert_eq!(decision, CooldownDecision::Promoted { slug: slug.clone() });

        // Counter was reset on promotion, so the next hit counts from 1
        let decision = gate
            .check(&slug, &[0.5; 6], &[], "", &catalog, "explorar")
            .await;
        assert!(matches!(decision, CooldownDecision::Alias { .. }));
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_window_expiry_restarts_count() {
        let store = CounterStore::connect("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect to Redis");
        let slug = format!("test-vibe-{}", uuid::Uuid::new_v4());

        // Threshold 3 with a 1 second window
        let gate = CooldownGate::new(Some(store), 1, 3);
        let catalog = vec![entry("chaos-fiesta", vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.1])];

        for _ in 0..2 {
            let decision = gate
                .check(&slug, &[0.5; 6], &[], "", &catalog, "explorar")
                .await;
            assert!(matches!(decision, CooldownDecision::Alias { .. }));
        }

        tokio::time::sleep(std::time::Duration::from_millis(1500)).await;

        // The window expired at 2 hits; this third hit restarts at 1
        // instead of promoting
        let decision = gate
            .check(&slug, &[0.5; 6], &[], "", &catalog, "explorar")
            .await;
        assert!(matches!(decision, CooldownDecision::Alias { .. }));
    }
}
