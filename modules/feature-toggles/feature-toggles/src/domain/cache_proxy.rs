//! Write-through caching proxy over a feature store.

use std::sync::Arc;

use async_trait::async_trait;
use feature_toggles_sdk::{CacheStatus, Feature};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use super::cache::FeatureCache;
use super::error::DomainError;
use super::keyed_lock::KeyedLock;
use super::store::FeatureStore;

/// Cached result of `list_all`, tagged with the mutation generation it was fetched in.
#[derive(Default)]
struct ListView {
    generation: u64,
    features: Option<Arc<Vec<Feature>>>,
}

/// Drop-in [`FeatureStore`] that serves reads from a cache backend and writes through
/// to the wrapped store.
///
/// - Reads consult the cache first; a miss loads from the store and populates the cache.
/// - Mutations go to the store first. Only on success is the entry refreshed
///   (create, update, enable, disable) or evicted (delete). An entry that cannot be
///   evicted clears the whole cache. A failed store call leaves
///   the cache untouched and its error propagates unchanged.
/// - Every mutation invalidates the cached `list_all` view.
///
/// The store write and the cache update for one UID happen under that UID's lock, and a
/// cache miss populates under the same lock, so a reader can never re-insert a value
/// older than a completed write. Without a cache backend the proxy is a pass-through.
pub struct CacheProxy {
    target: Arc<dyn FeatureStore>,
    cache: Option<Arc<dyn FeatureCache>>,
    locks: KeyedLock,
    list_view: Mutex<ListView>,
}

impl CacheProxy {
    #[must_use]
    pub fn new(target: Arc<dyn FeatureStore>, cache: Arc<dyn FeatureCache>) -> Self {
        Self::with_optional_cache(target, Some(cache))
    }

    /// A proxy with caching disabled.
    #[must_use]
    pub fn pass_through(target: Arc<dyn FeatureStore>) -> Self {
        Self::with_optional_cache(target, None)
    }

    #[must_use]
    pub fn with_optional_cache(
        target: Arc<dyn FeatureStore>,
        cache: Option<Arc<dyn FeatureCache>>,
    ) -> Self {
        Self {
            target,
            cache,
            locks: KeyedLock::new(),
            list_view: Mutex::new(ListView::default()),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn FeatureStore> {
        &self.target
    }

    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop every cached entry and the cached list view.
    ///
    /// # Errors
    ///
    /// Cache backend failures.
    pub async fn clear_cache(&self) -> Result<(), DomainError> {
        self.invalidate_list();
        if let Some(cache) = &self.cache {
            cache.clear().await?;
            debug!(cache_type = %cache.cache_type(), "Feature cache cleared");
        }
        Ok(())
    }

    /// Backend name and cached UIDs, or `None` when caching is disabled.
    ///
    /// # Errors
    ///
    /// Cache backend failures.
    pub async fn cache_status(&self) -> Result<Option<CacheStatus>, DomainError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let mut cached_features = cache.cached_uids().await?;
        cached_features.sort();
        Ok(Some(CacheStatus {
            cache_type: cache.cache_type(),
            cached_features,
        }))
    }

    fn invalidate_list(&self) {
        let mut view = self.list_view.lock();
        view.generation = view.generation.wrapping_add(1);
        view.features = None;
    }

    /// Remove `uid` from the cache. When the entry cannot be evicted the whole cache is
    /// cleared instead; only if that fails too is the eviction error returned.
    async fn purge(cache: &dyn FeatureCache, uid: &str) -> Result<(), DomainError> {
        let Err(e) = cache.evict(uid).await else {
            return Ok(());
        };
        warn!(uid, error = %e, "Cache eviction failed, clearing cache");
        if let Err(clear_err) = cache.clear().await {
            warn!(uid, error = %clear_err, "Cache clear failed, entry may be stale");
            return Err(e);
        }
        Ok(())
    }

    /// Put the freshly written value into the cache. If the backend rejects it, the entry
    /// is purged so no older value survives, and the put error is returned.
    async fn refresh(cache: &dyn FeatureCache, feature: &Feature) -> Result<(), DomainError> {
        if let Err(e) = cache.put(feature).await {
            warn!(uid = %feature.uid, error = %e, "Cache refresh failed after store write");
            Self::purge(cache, &feature.uid).await?;
            return Err(e);
        }
        debug!(uid = %feature.uid, "Cache entry refreshed");
        Ok(())
    }

    /// Re-read a mutated feature from the store and refresh its cache entry.
    async fn reload(&self, cache: &dyn FeatureCache, uid: &str) -> Result<(), DomainError> {
        match self.target.get(uid).await {
            Ok(feature) => Self::refresh(cache, &feature).await,
            Err(e) => {
                Self::purge(cache, uid).await?;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl FeatureStore for CacheProxy {
    fn store_type(&self) -> String {
        self.target.store_type()
    }

    fn cache_type(&self) -> Option<String> {
        self.cache.as_ref().map(|c| c.cache_type())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get(&self, uid: &str) -> Result<Feature, DomainError> {
        let Some(cache) = &self.cache else {
            return self.target.get(uid).await;
        };

        if let Some(feature) = cache.get(uid).await? {
            debug!("Cache hit");
            return Ok(feature);
        }

        let _guard = self.locks.lock(uid).await;
        // A writer may have refreshed the entry while we waited.
        if let Some(feature) = cache.get(uid).await? {
            debug!("Cache hit after wait");
            return Ok(feature);
        }

        debug!("Cache miss, loading from store");
        let feature = self.target.get(uid).await?;
        cache.put(&feature).await?;
        Ok(feature)
    }

    #[instrument(level = "debug", skip(self))]
    async fn exists(&self, uid: &str) -> Result<bool, DomainError> {
        if self.cache.is_none() {
            return self.target.exists(uid).await;
        }
        match self.get(uid).await {
            Ok(_) => Ok(true),
            Err(DomainError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip(self, feature), fields(uid = %feature.uid))]
    async fn create(&self, feature: Feature) -> Result<(), DomainError> {
        let _guard = self.locks.lock(&feature.uid).await;
        let Some(cache) = &self.cache else {
            return self.target.create(feature).await;
        };

        self.target.create(feature.clone()).await?;
        self.invalidate_list();
        Self::refresh(cache.as_ref(), &feature).await
    }

    #[instrument(level = "debug", skip(self, feature), fields(uid = %feature.uid))]
    async fn update(&self, feature: Feature) -> Result<(), DomainError> {
        let _guard = self.locks.lock(&feature.uid).await;
        let Some(cache) = &self.cache else {
            return self.target.update(feature).await;
        };

        self.target.update(feature.clone()).await?;
        self.invalidate_list();
        Self::refresh(cache.as_ref(), &feature).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, uid: &str) -> Result<(), DomainError> {
        let _guard = self.locks.lock(uid).await;
        let Some(cache) = &self.cache else {
            return self.target.delete(uid).await;
        };

        self.target.delete(uid).await?;
        self.invalidate_list();
        Self::purge(cache.as_ref(), uid).await?;
        debug!("Cache entry evicted");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn enable(&self, uid: &str) -> Result<(), DomainError> {
        let _guard = self.locks.lock(uid).await;
        let Some(cache) = &self.cache else {
            return self.target.enable(uid).await;
        };

        self.target.enable(uid).await?;
        self.invalidate_list();
        self.reload(cache.as_ref(), uid).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn disable(&self, uid: &str) -> Result<(), DomainError> {
        let _guard = self.locks.lock(uid).await;
        let Some(cache) = &self.cache else {
            return self.target.disable(uid).await;
        };

        self.target.disable(uid).await?;
        self.invalidate_list();
        self.reload(cache.as_ref(), uid).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_all(&self) -> Result<Vec<Feature>, DomainError> {
        if self.cache.is_none() {
            return self.target.list_all().await;
        }

        let generation = {
            let view = self.list_view.lock();
            if let Some(features) = &view.features {
                debug!("List view hit");
                return Ok(features.as_ref().clone());
            }
            view.generation
        };

        let features = self.target.list_all().await?;

        let mut view = self.list_view.lock();
        // A mutation completed while we were reading; the fetched list may predate it.
        if view.generation == generation {
            view.features = Some(Arc::new(features.clone()));
        }
        Ok(features)
    }
}
