use std::sync::Arc;

use async_trait::async_trait;
use feature_toggles_sdk::{
    Feature, FeatureAction, FeatureSpec, FeatureTogglesClientV1, FeatureTogglesError,
    FeaturesStatus, FlipParams, SecurityInfo,
};

use crate::runtime::FeatureToggles;

/// In-process implementation of the public client API.
pub struct LocalClient {
    toggles: Arc<FeatureToggles>,
}

impl LocalClient {
    #[must_use]
    pub fn new(toggles: Arc<FeatureToggles>) -> Self {
        Self { toggles }
    }
}

#[async_trait]
impl FeatureTogglesClientV1 for LocalClient {
    async fn check(&self, uid: &str) -> Result<bool, FeatureTogglesError> {
        self.toggles.check(uid).await.map_err(Into::into)
    }

    async fn check_with(
        &self,
        uid: &str,
        params: &FlipParams,
    ) -> Result<bool, FeatureTogglesError> {
        self.toggles.check_with(uid, params).await.map_err(Into::into)
    }

    async fn get_feature(&self, uid: &str) -> Result<Feature, FeatureTogglesError> {
        self.toggles.get_feature(uid).await.map_err(Into::into)
    }

    async fn list_features(&self) -> Result<Vec<Feature>, FeatureTogglesError> {
        self.toggles
            .admin()
            .list_features()
            .await
            .map_err(Into::into)
    }

    async fn create_or_update_feature(
        &self,
        uid: &str,
        spec: FeatureSpec,
    ) -> Result<FeatureAction, FeatureTogglesError> {
        self.toggles
            .admin()
            .create_or_update(uid, spec)
            .await
            .map_err(Into::into)
    }

    async fn delete_feature(&self, uid: &str) -> Result<FeatureAction, FeatureTogglesError> {
        self.toggles.admin().delete(uid).await.map_err(Into::into)
    }

    async fn enable_feature(&self, uid: &str) -> Result<(), FeatureTogglesError> {
        self.toggles.admin().enable(uid).await.map_err(Into::into)
    }

    async fn disable_feature(&self, uid: &str) -> Result<(), FeatureTogglesError> {
        self.toggles.admin().disable(uid).await.map_err(Into::into)
    }

    async fn status(&self) -> Result<FeaturesStatus, FeatureTogglesError> {
        self.toggles.status().await.map_err(Into::into)
    }

    async fn security_info(&self) -> Result<SecurityInfo, FeatureTogglesError> {
        self.toggles.security_info().await.map_err(Into::into)
    }
}
