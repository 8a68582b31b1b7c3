//! In-memory feature store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use feature_toggles_sdk::Feature;
use parking_lot::RwLock;

use crate::domain::error::DomainError;
use crate::domain::store::FeatureStore;

/// Feature store backed by an ordered in-process map.
///
/// Listing order is by UID.
#[derive(Default)]
pub struct InMemoryFeatureStore {
    features: RwLock<BTreeMap<String, Feature>>,
}

impl InMemoryFeatureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given features. Later duplicates replace earlier ones.
    #[must_use]
    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            features: RwLock::new(
                features
                    .into_iter()
                    .map(|feature| (feature.uid.clone(), feature))
                    .collect(),
            ),
        }
    }

    fn set_enabled(&self, uid: &str, enabled: bool) -> Result<(), DomainError> {
        let mut features = self.features.write();
        let feature = features
            .get_mut(uid)
            .ok_or_else(|| DomainError::not_found(uid))?;
        feature.enabled = enabled;
        Ok(())
    }
}

#[async_trait]
impl FeatureStore for InMemoryFeatureStore {
    fn store_type(&self) -> String {
        "InMemoryFeatureStore".to_owned()
    }

    async fn get(&self, uid: &str) -> Result<Feature, DomainError> {
        self.features
            .read()
            .get(uid)
            .cloned()
            .ok_or_else(|| DomainError::not_found(uid))
    }

    async fn exists(&self, uid: &str) -> Result<bool, DomainError> {
        Ok(self.features.read().contains_key(uid))
    }

    async fn create(&self, feature: Feature) -> Result<(), DomainError> {
        let mut features = self.features.write();
        if features.contains_key(&feature.uid) {
            return Err(DomainError::already_exists(&feature.uid));
        }
        features.insert(feature.uid.clone(), feature);
        Ok(())
    }

    async fn update(&self, feature: Feature) -> Result<(), DomainError> {
        let mut features = self.features.write();
        let slot = features
            .get_mut(&feature.uid)
            .ok_or_else(|| DomainError::not_found(&feature.uid))?;
        *slot = feature;
        Ok(())
    }

    async fn delete(&self, uid: &str) -> Result<(), DomainError> {
        self.features
            .write()
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(uid))
    }

    async fn enable(&self, uid: &str) -> Result<(), DomainError> {
        self.set_enabled(uid, true)
    }

    async fn disable(&self, uid: &str) -> Result<(), DomainError> {
        self.set_enabled(uid, false)
    }

    async fn list_all(&self) -> Result<Vec<Feature>, DomainError> {
        Ok(self.features.read().values().cloned().collect())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use feature_toggles_sdk::FlippingStrategy;

    use super::*;

    #[tokio::test]
    async fn create_then_get_returns_value_unchanged() {
        let store = InMemoryFeatureStore::new();
        let feature = Feature::new("login")
            .enabled(true)
            .with_description("login page")
            .in_group("auth")
            .with_permissions(["ROLE_USER"])
            .with_strategy(FlippingStrategy::new("Ponderation").with_param("weight", "0.3"));

        store.create(feature.clone()).await.unwrap();
        assert_eq!(store.get("login").await.unwrap(), feature);
    }

    #[tokio::test]
    async fn create_existing_uid_fails() {
        let store = InMemoryFeatureStore::with_features([Feature::new("a")]);
        let err = store.create(Feature::new("a").enabled(true)).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(uid) if uid == "a"));
        assert!(!store.get("a").await.unwrap().enabled);
    }

    #[tokio::test]
    async fn mutations_on_missing_uid_fail_with_not_found() {
        let store = InMemoryFeatureStore::new();
        assert!(matches!(
            store.update(Feature::new("x")).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(store.delete("x").await, Err(DomainError::NotFound(_))));
        assert!(matches!(store.enable("x").await, Err(DomainError::NotFound(_))));
        assert!(matches!(store.disable("x").await, Err(DomainError::NotFound(_))));
        assert!(matches!(store.get("x").await, Err(DomainError::NotFound(_))));
        assert!(!store.exists("x").await.unwrap());
    }

    #[tokio::test]
    async fn enable_disable_and_delete() {
        let store = InMemoryFeatureStore::with_features([Feature::new("a")]);

        store.enable("a").await.unwrap();
        assert!(store.get("a").await.unwrap().enabled);

        store.disable("a").await.unwrap();
        assert!(!store.get("a").await.unwrap().enabled);

        store.delete("a").await.unwrap();
        assert!(!store.exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_uid() {
        let store = InMemoryFeatureStore::with_features([
            Feature::new("c"),
            Feature::new("a"),
            Feature::new("b"),
        ]);
        let uids: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.uid)
            .collect();
        assert_eq!(uids, vec!["a", "b", "c"]);
    }
}
