#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for feature-toggles integration tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use feature_toggles::{
    DomainError, Feature, FeatureCache, FeatureSpec, FeatureStore, FeatureToggles,
    FeatureTogglesConfig, FlipParams, InMemoryFeatureCache, InMemoryFeatureStore,
};

pub fn create_toggles() -> Arc<FeatureToggles> {
    Arc::new(FeatureToggles::from_config(FeatureTogglesConfig::default()))
}

pub fn create_toggles_with(config: FeatureTogglesConfig) -> Arc<FeatureToggles> {
    Arc::new(FeatureToggles::from_config(config))
}

pub fn enabled_spec() -> FeatureSpec {
    FeatureSpec {
        enabled: true,
        ..FeatureSpec::default()
    }
}

pub fn params(pairs: &[(&str, &str)]) -> FlipParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Store whose reads take `delay` before answering, to widen race windows.
pub struct SlowStore {
    pub inner: InMemoryFeatureStore,
    pub delay: Duration,
}

impl SlowStore {
    pub fn new(features: Vec<Feature>, delay: Duration) -> Self {
        Self {
            inner: InMemoryFeatureStore::with_features(features),
            delay,
        }
    }
}

#[async_trait]
impl FeatureStore for SlowStore {
    fn store_type(&self) -> String {
        "SlowStore".to_owned()
    }

    async fn get(&self, uid: &str) -> Result<Feature, DomainError> {
        let feature = self.inner.get(uid).await;
        tokio::time::sleep(self.delay).await;
        feature
    }

    async fn exists(&self, uid: &str) -> Result<bool, DomainError> {
        self.inner.exists(uid).await
    }

    async fn create(&self, feature: Feature) -> Result<(), DomainError> {
        self.inner.create(feature).await
    }

    async fn update(&self, feature: Feature) -> Result<(), DomainError> {
        self.inner.update(feature).await
    }

    async fn delete(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.delete(uid).await
    }

    async fn enable(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.enable(uid).await
    }

    async fn disable(&self, uid: &str) -> Result<(), DomainError> {
        self.inner.disable(uid).await
    }

    async fn list_all(&self) -> Result<Vec<Feature>, DomainError> {
        let features = self.inner.list_all().await;
        tokio::time::sleep(self.delay).await;
        features
    }
}

/// Cache whose writes and evictions can be made to fail on demand.
#[derive(Default)]
pub struct FlakyCache {
    pub inner: InMemoryFeatureCache,
    pub fail_puts: AtomicBool,
    pub fail_evicts: AtomicBool,
}

impl FlakyCache {
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_evicts(&self, fail: bool) {
        self.fail_evicts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FeatureCache for FlakyCache {
    fn cache_type(&self) -> String {
        "FlakyCache".to_owned()
    }

    async fn get(&self, uid: &str) -> Result<Option<Feature>, DomainError> {
        self.inner.get(uid).await
    }

    async fn put(&self, feature: &Feature) -> Result<(), DomainError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("cache node unavailable").into());
        }
        self.inner.put(feature).await
    }

    async fn evict(&self, uid: &str) -> Result<(), DomainError> {
        if self.fail_evicts.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("cache node unavailable").into());
        }
        self.inner.evict(uid).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.inner.clear().await
    }

    async fn cached_uids(&self) -> Result<Vec<String>, DomainError> {
        self.inner.cached_uids().await
    }
}
