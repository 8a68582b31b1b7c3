//! The feature toggles runtime: current store, optional authorization manager, strategy
//! registry and configuration, with swap operations for each collaborator.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use feature_toggles_sdk::{Feature, FeaturesStatus, FlipParams, SecurityInfo};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::config::FeatureTogglesConfig;
use crate::domain::admin::FeatureAdminService;
use crate::domain::authorization::AuthorizationManager;
use crate::domain::cache::FeatureCache;
use crate::domain::cache_proxy::CacheProxy;
use crate::domain::error::DomainError;
use crate::domain::flip::FlipEngine;
use crate::domain::store::FeatureStore;
use crate::domain::strategy::StrategyRegistry;
use crate::infra::{InMemoryFeatureCache, InMemoryFeatureStore};

/// The store in use, plus the proxy when it is a cached one.
struct StoreSlot {
    store: Arc<dyn FeatureStore>,
    proxy: Option<Arc<CacheProxy>>,
}

impl StoreSlot {
    fn plain(store: Arc<dyn FeatureStore>) -> Self {
        Self { store, proxy: None }
    }

    fn cached(proxy: CacheProxy) -> Self {
        let proxy = Arc::new(proxy);
        Self {
            store: proxy.clone(),
            proxy: Some(proxy),
        }
    }

    /// The store underneath any cache proxy.
    fn backing(&self) -> Arc<dyn FeatureStore> {
        match &self.proxy {
            Some(proxy) => proxy.target().clone(),
            None => self.store.clone(),
        }
    }
}

struct AuthorizationSlot(Arc<dyn AuthorizationManager>);

/// Entry point for checks and administration.
///
/// Each instance is self-contained; tests build their own. Swapping a collaborator is a
/// configuration change: checks already running finish against the previous one.
pub struct FeatureToggles {
    store: ArcSwap<StoreSlot>,
    authorization: ArcSwapOption<AuthorizationSlot>,
    strategies: Arc<StrategyRegistry>,
    config: FeatureTogglesConfig,
    admin_lock: Arc<Mutex<()>>,
}

impl FeatureToggles {
    /// A runtime over `store` with the built-in strategies and no authorization manager.
    /// The store is used as given; see [`FeatureToggles::enable_cache`].
    #[must_use]
    pub fn new(store: Arc<dyn FeatureStore>, config: FeatureTogglesConfig) -> Self {
        Self {
            store: ArcSwap::from_pointee(StoreSlot::plain(store)),
            authorization: ArcSwapOption::from(None),
            strategies: Arc::new(StrategyRegistry::default()),
            config,
            admin_lock: Arc::new(Mutex::new(())),
        }
    }

    /// An in-memory store, behind an in-memory cache when `config.cache.enabled`.
    #[must_use]
    pub fn from_config(config: FeatureTogglesConfig) -> Self {
        let cache = config.cache.clone();
        let toggles = Self::new(Arc::new(InMemoryFeatureStore::new()), config);
        if cache.enabled {
            toggles.enable_cache(Arc::new(InMemoryFeatureCache::with_ttl(
                Duration::from_secs(cache.ttl_secs),
            )));
        }
        toggles
    }

    /// Replace the strategy registry, e.g. to add custom strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    #[must_use]
    pub fn config(&self) -> &FeatureTogglesConfig {
        &self.config
    }

    #[must_use]
    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// The current store, a cache proxy when caching is enabled.
    #[must_use]
    pub fn store(&self) -> Arc<dyn FeatureStore> {
        self.store.load().store.clone()
    }

    #[must_use]
    pub fn authorization(&self) -> Option<Arc<dyn AuthorizationManager>> {
        self.authorization
            .load()
            .as_ref()
            .map(|slot| slot.0.clone())
    }

    /// Use `store` directly, dropping any cache.
    pub fn set_store(&self, store: Arc<dyn FeatureStore>) {
        info!(store_type = %store.store_type(), "Feature store replaced");
        self.store.store(Arc::new(StoreSlot::plain(store)));
    }

    /// Put `cache` in front of the current backing store, replacing any previous cache.
    pub fn enable_cache(&self, cache: Arc<dyn FeatureCache>) {
        let backing = self.store.load().backing();
        info!(
            store_type = %backing.store_type(),
            cache_type = %cache.cache_type(),
            "Feature cache enabled"
        );
        self.store
            .store(Arc::new(StoreSlot::cached(CacheProxy::new(backing, cache))));
    }

    /// Talk to the backing store directly again.
    pub fn disable_cache(&self) {
        let backing = self.store.load().backing();
        info!("Feature cache disabled");
        self.store.store(Arc::new(StoreSlot::plain(backing)));
    }

    pub fn set_authorization(&self, manager: Arc<dyn AuthorizationManager>) {
        info!(manager = %manager.manager_type(), "Authorization manager set");
        self.authorization
            .store(Some(Arc::new(AuthorizationSlot(manager))));
    }

    pub fn clear_authorization(&self) {
        info!("Authorization manager cleared");
        self.authorization.store(None);
    }

    /// A flip engine over the current collaborators.
    #[must_use]
    pub fn engine(&self) -> FlipEngine {
        FlipEngine::new(self.store(), self.strategies.clone())
            .with_authorization(self.authorization())
            .with_permission_match(self.config.permission_match)
            .with_autocreate(self.config.autocreate)
    }

    /// An administration service over the current store.
    #[must_use]
    pub fn admin(&self) -> FeatureAdminService {
        FeatureAdminService::new(
            self.store(),
            self.strategies.clone(),
            self.admin_lock.clone(),
        )
    }

    /// # Errors
    ///
    /// See [`FlipEngine::check_with`].
    pub async fn check(&self, uid: &str) -> Result<bool, DomainError> {
        self.engine().check(uid).await
    }

    /// # Errors
    ///
    /// See [`FlipEngine::check_with`].
    pub async fn check_with(&self, uid: &str, params: &FlipParams) -> Result<bool, DomainError> {
        self.engine().check_with(uid, params).await
    }

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is unknown.
    pub async fn get_feature(&self, uid: &str) -> Result<Feature, DomainError> {
        self.store().get(uid).await
    }

    /// Drop every cached entry; a no-op without a cache.
    ///
    /// # Errors
    ///
    /// Cache backend failures.
    pub async fn clear_cache(&self) -> Result<(), DomainError> {
        let slot = self.store.load_full();
        match &slot.proxy {
            Some(proxy) => proxy.clear_cache().await,
            None => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Store or cache backend failures.
    #[instrument(level = "debug", skip(self))]
    pub async fn status(&self) -> Result<FeaturesStatus, DomainError> {
        let slot = self.store.load_full();
        let cache = match &slot.proxy {
            Some(proxy) => proxy.cache_status().await?,
            None => None,
        };
        let features = slot.store.list_all().await?;
        let groups: BTreeSet<&str> = features
            .iter()
            .filter_map(|feature| feature.group.as_deref())
            .collect();
        let authorization = self.authorization();

        Ok(FeaturesStatus {
            store_type: slot.store.store_type(),
            cache,
            autocreate: self.config.autocreate,
            security_enabled: authorization.is_some(),
            authorization_manager: authorization.map(|m| m.manager_type()),
            features_count: features.len(),
            groups_count: groups.len(),
        })
    }

    /// # Errors
    ///
    /// `DomainError::SecurityUnavailable` without an authorization manager; backend
    /// failures otherwise.
    pub async fn security_info(&self) -> Result<SecurityInfo, DomainError> {
        let manager = self
            .authorization()
            .ok_or(DomainError::SecurityUnavailable)?;
        Ok(SecurityInfo {
            authorization_manager: manager.manager_type(),
            current_user_permissions: manager.current_user_permissions().await?,
            all_permissions: manager.all_permissions().await?,
        })
    }
}
