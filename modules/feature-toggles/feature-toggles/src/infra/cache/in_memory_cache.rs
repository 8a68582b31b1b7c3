//! In-process cache backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use feature_toggles_sdk::Feature;

use crate::domain::cache::FeatureCache;
use crate::domain::error::DomainError;

struct CacheEntry {
    feature: Feature,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Feature cache held in a concurrent map.
///
/// With a TTL, entries past their lifetime read as misses and are purged on access.
#[derive(Default)]
pub struct InMemoryFeatureCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Option<Duration>,
}

impl InMemoryFeatureCache {
    /// A cache whose entries live until invalidated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose entries expire `ttl` after being written. A zero TTL disables expiry.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: (!ttl.is_zero()).then_some(ttl),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

#[async_trait]
impl FeatureCache for InMemoryFeatureCache {
    fn cache_type(&self) -> String {
        "InMemoryFeatureCache".to_owned()
    }

    async fn get(&self, uid: &str) -> Result<Option<Feature>, DomainError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(uid) {
            if entry.is_valid(now) {
                return Ok(Some(entry.feature.clone()));
            }
        }
        self.entries.remove_if(uid, |_, entry| !entry.is_valid(now));
        Ok(None)
    }

    async fn put(&self, feature: &Feature) -> Result<(), DomainError> {
        let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(
            feature.uid.clone(),
            CacheEntry {
                feature: feature.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn evict(&self, uid: &str) -> Result<(), DomainError> {
        self.entries.remove(uid);
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.clear();
        Ok(())
    }

    async fn cached_uids(&self) -> Result<Vec<String>, DomainError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.value().is_valid(now))
            .map(|entry| entry.key().clone())
            .collect())
    }
}
