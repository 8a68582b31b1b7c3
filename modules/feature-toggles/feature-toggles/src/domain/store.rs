//! Feature store contract.

use async_trait::async_trait;
use feature_toggles_sdk::Feature;

use super::error::DomainError;

/// Authoritative mapping from feature UID to feature definition.
///
/// Every call completes before returning; implementations decide how they block.
/// A `create` followed by a `get` on the same UID, with no mutation in between,
/// returns the created value unchanged.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Human-readable implementation name, reported by status introspection.
    fn store_type(&self) -> String;

    /// Cache backend name when this store is a caching proxy.
    fn cache_type(&self) -> Option<String> {
        None
    }

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is unknown.
    async fn get(&self, uid: &str) -> Result<Feature, DomainError>;

    /// # Errors
    ///
    /// Backend failures only; a missing UID is `Ok(false)`.
    async fn exists(&self, uid: &str) -> Result<bool, DomainError>;

    /// # Errors
    ///
    /// `DomainError::AlreadyExists` if the UID is present.
    async fn create(&self, feature: Feature) -> Result<(), DomainError>;

    /// Replace an existing definition.
    ///
    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is absent.
    async fn update(&self, feature: Feature) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is absent.
    async fn delete(&self, uid: &str) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is absent.
    async fn enable(&self, uid: &str) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is absent.
    async fn disable(&self, uid: &str) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// Backend failures.
    async fn list_all(&self) -> Result<Vec<Feature>, DomainError>;
}
