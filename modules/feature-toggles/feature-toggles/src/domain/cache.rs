//! Cache backend contract used by the cache proxy.

use async_trait::async_trait;
use feature_toggles_sdk::Feature;

use super::error::DomainError;

/// Storage for cached feature definitions.
///
/// Backends may be local (in-memory) or external; the proxy treats every call as
/// opaque and propagates failures.
#[async_trait]
pub trait FeatureCache: Send + Sync {
    fn cache_type(&self) -> String;

    /// Returns `None` on a miss, including entries that are no longer valid.
    ///
    /// # Errors
    ///
    /// Backend failures.
    async fn get(&self, uid: &str) -> Result<Option<Feature>, DomainError>;

    /// # Errors
    ///
    /// Backend failures.
    async fn put(&self, feature: &Feature) -> Result<(), DomainError>;

    /// Removing an absent entry is not an error.
    ///
    /// # Errors
    ///
    /// Backend failures.
    async fn evict(&self, uid: &str) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// Backend failures.
    async fn clear(&self) -> Result<(), DomainError>;

    /// UIDs of currently valid entries.
    ///
    /// # Errors
    ///
    /// Backend failures.
    async fn cached_uids(&self) -> Result<Vec<String>, DomainError>;
}
