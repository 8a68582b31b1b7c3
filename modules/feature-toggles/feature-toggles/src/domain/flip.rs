//! Flip evaluation: stored state, then permissions, then strategy.

use std::sync::Arc;

use feature_toggles_sdk::{Feature, FlipParams};
use tracing::{debug, info, instrument};

use super::authorization::AuthorizationManager;
use super::error::DomainError;
use super::store::FeatureStore;
use super::strategy::{StrategyParams, StrategyRegistry};
use crate::config::PermissionMatch;

/// Decides whether a feature is on for the current caller.
///
/// The engine holds a snapshot of its collaborators; build a new one after swapping
/// the store or the authorization manager.
pub struct FlipEngine {
    store: Arc<dyn FeatureStore>,
    authorization: Option<Arc<dyn AuthorizationManager>>,
    strategies: Arc<StrategyRegistry>,
    permission_match: PermissionMatch,
    autocreate: bool,
}

impl FlipEngine {
    /// An engine without authorization, requiring `All` permissions and failing on
    /// unknown UIDs.
    #[must_use]
    pub fn new(store: Arc<dyn FeatureStore>, strategies: Arc<StrategyRegistry>) -> Self {
        Self {
            store,
            authorization: None,
            strategies,
            permission_match: PermissionMatch::default(),
            autocreate: false,
        }
    }

    #[must_use]
    pub fn with_authorization(
        mut self,
        authorization: Option<Arc<dyn AuthorizationManager>>,
    ) -> Self {
        self.authorization = authorization;
        self
    }

    #[must_use]
    pub fn with_permission_match(mut self, permission_match: PermissionMatch) -> Self {
        self.permission_match = permission_match;
        self
    }

    #[must_use]
    pub fn with_autocreate(mut self, autocreate: bool) -> Self {
        self.autocreate = autocreate;
        self
    }

    /// # Errors
    ///
    /// See [`FlipEngine::check_with`].
    pub async fn check(&self, uid: &str) -> Result<bool, DomainError> {
        self.check_with(uid, &FlipParams::new()).await
    }

    /// Evaluate `uid` with caller-supplied strategy parameters.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotFound` if the UID is unknown and autocreate is off
    /// - `DomainError::Configuration` if the feature names an unregistered strategy
    /// - `DomainError::InvalidParameter` if the strategy lacks a parameter
    /// - store and authorization failures, unchanged
    #[instrument(level = "debug", skip(self, params))]
    pub async fn check_with(&self, uid: &str, params: &FlipParams) -> Result<bool, DomainError> {
        let Some(feature) = self.resolve(uid).await? else {
            return Ok(false);
        };

        if !feature.enabled {
            debug!("Feature disabled");
            return Ok(false);
        }

        if !self.permitted(&feature).await? {
            debug!("Permission gate refused");
            return Ok(false);
        }

        let decision = self.strategy_allows(&feature, params).await?;
        debug!(decision, "Strategy gate decided");
        Ok(decision)
    }

    /// `None` when the feature was just autocreated, which always evaluates to off.
    async fn resolve(&self, uid: &str) -> Result<Option<Feature>, DomainError> {
        match self.store.get(uid).await {
            Ok(feature) => Ok(Some(feature)),
            Err(DomainError::NotFound(_)) if self.autocreate => {
                match self.store.create(Feature::new(uid)).await {
                    Ok(()) => {
                        info!(uid, "Unknown feature created disabled");
                        Ok(None)
                    }
                    // Someone else created it first; evaluate their definition.
                    Err(DomainError::AlreadyExists(_)) => self.store.get(uid).await.map(Some),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn permitted(&self, feature: &Feature) -> Result<bool, DomainError> {
        if feature.permissions.is_empty() {
            return Ok(true);
        }
        let Some(authorization) = &self.authorization else {
            return Ok(true);
        };

        let held = authorization.current_user_permissions().await?;
        Ok(match self.permission_match {
            PermissionMatch::Any => held.intersects(&feature.permissions),
            PermissionMatch::All => held.covers(&feature.permissions),
        })
    }

    async fn strategy_allows(
        &self,
        feature: &Feature,
        supplied: &FlipParams,
    ) -> Result<bool, DomainError> {
        let Some(descriptor) = &feature.strategy else {
            return Ok(true);
        };
        let strategy = self.strategies.get(&descriptor.name)?;
        let params = StrategyParams::merge(&descriptor.params, supplied);
        strategy
            .evaluate(&feature.uid, &params, self.store.as_ref())
            .await
    }
}
