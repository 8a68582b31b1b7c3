//! `FeatureTogglesClientV1` trait definition.
//!
//! This trait defines the public API for the feature-toggles module: flip checks for
//! high-frequency consumers and administration for the rare mutations.

use async_trait::async_trait;

use crate::errors::FeatureTogglesError;
use crate::models::{
    Feature, FeatureAction, FeatureSpec, FeaturesStatus, FlipParams, SecurityInfo,
};

/// Public API trait for the feature-toggles module.
///
/// Every method fails loudly: an unknown UID is `NotFound`, never a silent `false`.
#[async_trait]
pub trait FeatureTogglesClientV1: Send + Sync {
    /// Is the feature currently on?
    async fn check(&self, uid: &str) -> Result<bool, FeatureTogglesError>;

    /// Is the feature currently on for these caller parameters?
    async fn check_with(&self, uid: &str, params: &FlipParams)
    -> Result<bool, FeatureTogglesError>;

    async fn get_feature(&self, uid: &str) -> Result<Feature, FeatureTogglesError>;

    async fn list_features(&self) -> Result<Vec<Feature>, FeatureTogglesError>;

    /// Create the feature if absent, update it if it differs, otherwise report `Unchanged`.
    async fn create_or_update_feature(
        &self,
        uid: &str,
        spec: FeatureSpec,
    ) -> Result<FeatureAction, FeatureTogglesError>;

    async fn delete_feature(&self, uid: &str) -> Result<FeatureAction, FeatureTogglesError>;

    async fn enable_feature(&self, uid: &str) -> Result<(), FeatureTogglesError>;

    async fn disable_feature(&self, uid: &str) -> Result<(), FeatureTogglesError>;

    async fn status(&self) -> Result<FeaturesStatus, FeatureTogglesError>;

    /// Fails with `SecurityUnavailable` when no authorization manager is configured.
    async fn security_info(&self) -> Result<SecurityInfo, FeatureTogglesError>;
}
