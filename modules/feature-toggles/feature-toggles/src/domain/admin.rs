use std::collections::BTreeSet;
use std::sync::Arc;

use feature_toggles_sdk::{Feature, FeatureAction, FeatureSpec};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::error::DomainError;
use super::store::FeatureStore;
use super::strategy::{StrategyParams, StrategyRegistry};

/// Administrative mutations over the feature store.
///
/// Requests are validated before the store or cache is touched. Read-modify-write
/// operations run under a lock shared by every service built from the same runtime,
/// so concurrent administrators observe exact outcomes.
pub struct FeatureAdminService {
    store: Arc<dyn FeatureStore>,
    strategies: Arc<StrategyRegistry>,
    lock: Arc<Mutex<()>>,
}

impl FeatureAdminService {
    #[must_use]
    pub fn new(
        store: Arc<dyn FeatureStore>,
        strategies: Arc<StrategyRegistry>,
        lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            store,
            strategies,
            lock,
        }
    }

    /// Create the feature if absent, replace it if it differs, otherwise leave it alone.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a rejected request; store failures unchanged.
    #[instrument(skip(self, spec))]
    pub async fn create_or_update(
        &self,
        uid: &str,
        spec: FeatureSpec,
    ) -> Result<FeatureAction, DomainError> {
        self.validate(uid, &spec)?;
        let feature = spec.into_feature(uid);

        let _guard = self.lock.lock().await;
        let action = match self.store.get(uid).await {
            Ok(existing) if existing == feature => FeatureAction::Unchanged,
            Ok(_) => {
                self.store.update(feature).await?;
                FeatureAction::Updated
            }
            Err(DomainError::NotFound(_)) => match self.store.create(feature.clone()).await {
                Ok(()) => FeatureAction::Created,
                // Autocreated by a concurrent check.
                Err(DomainError::AlreadyExists(_)) => {
                    self.store.update(feature).await?;
                    FeatureAction::Updated
                }
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        };
        info!(?action, "Feature administered");
        Ok(action)
    }

    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank UID, `DomainError::NotFound` if the UID is
    /// absent.
    #[instrument(skip(self))]
    pub async fn delete(&self, uid: &str) -> Result<FeatureAction, DomainError> {
        Self::require_name("feature UID", uid)?;
        let _guard = self.lock.lock().await;
        self.store.delete(uid).await?;
        info!("Feature deleted");
        Ok(FeatureAction::Deleted)
    }

    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank UID, `DomainError::NotFound` if the UID is
    /// absent.
    #[instrument(skip(self))]
    pub async fn enable(&self, uid: &str) -> Result<(), DomainError> {
        Self::require_name("feature UID", uid)?;
        let _guard = self.lock.lock().await;
        self.store.enable(uid).await?;
        info!("Feature enabled");
        Ok(())
    }

    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank UID, `DomainError::NotFound` if the UID is
    /// absent.
    #[instrument(skip(self))]
    pub async fn disable(&self, uid: &str) -> Result<(), DomainError> {
        Self::require_name("feature UID", uid)?;
        let _guard = self.lock.lock().await;
        self.store.disable(uid).await?;
        info!("Feature disabled");
        Ok(())
    }

    /// # Errors
    ///
    /// Store failures.
    pub async fn list_features(&self) -> Result<Vec<Feature>, DomainError> {
        self.store.list_all().await
    }

    /// Add a required permission to a feature.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank permission, `DomainError::NotFound` if the
    /// UID is absent.
    #[instrument(skip(self))]
    pub async fn grant_permission(
        &self,
        uid: &str,
        permission: &str,
    ) -> Result<FeatureAction, DomainError> {
        Self::require_name("permission", permission)?;
        self.modify(uid, |feature| feature.permissions.insert(permission.to_owned()))
            .await
    }

    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank permission, `DomainError::NotFound` if the
    /// UID is absent.
    #[instrument(skip(self))]
    pub async fn revoke_permission(
        &self,
        uid: &str,
        permission: &str,
    ) -> Result<FeatureAction, DomainError> {
        Self::require_name("permission", permission)?;
        self.modify(uid, |feature| feature.permissions.remove(permission))
            .await
    }

    /// Move a feature into `group`, replacing any previous group.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidSpec` for a blank group, `DomainError::NotFound` if the UID
    /// is absent.
    #[instrument(skip(self))]
    pub async fn add_to_group(&self, uid: &str, group: &str) -> Result<FeatureAction, DomainError> {
        Self::require_name("group", group)?;
        self.modify(uid, |feature| {
            let changed = feature.group.as_deref() != Some(group);
            feature.group = Some(group.to_owned());
            changed
        })
        .await
    }

    /// # Errors
    ///
    /// `DomainError::NotFound` if the UID is absent.
    #[instrument(skip(self))]
    pub async fn remove_from_group(&self, uid: &str) -> Result<FeatureAction, DomainError> {
        self.modify(uid, |feature| feature.group.take().is_some())
            .await
    }

    /// Distinct group names, sorted.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn list_groups(&self) -> Result<Vec<String>, DomainError> {
        let groups: BTreeSet<String> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .filter_map(|feature| feature.group)
            .collect();
        Ok(groups.into_iter().collect())
    }

    /// # Errors
    ///
    /// `DomainError::GroupNotFound` if no feature belongs to `group`.
    pub async fn group_features(&self, group: &str) -> Result<Vec<Feature>, DomainError> {
        let members: Vec<Feature> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .filter(|feature| feature.group.as_deref() == Some(group))
            .collect();
        if members.is_empty() {
            return Err(DomainError::group_not_found(group));
        }
        Ok(members)
    }

    /// Enable every feature in `group`, returning their UIDs.
    ///
    /// # Errors
    ///
    /// `DomainError::GroupNotFound` if no feature belongs to `group`.
    #[instrument(skip(self))]
    pub async fn enable_group(&self, group: &str) -> Result<Vec<String>, DomainError> {
        self.toggle_group(group, true).await
    }

    /// Disable every feature in `group`, returning their UIDs.
    ///
    /// # Errors
    ///
    /// `DomainError::GroupNotFound` if no feature belongs to `group`.
    #[instrument(skip(self))]
    pub async fn disable_group(&self, group: &str) -> Result<Vec<String>, DomainError> {
        self.toggle_group(group, false).await
    }

    async fn toggle_group(&self, group: &str, enabled: bool) -> Result<Vec<String>, DomainError> {
        let _guard = self.lock.lock().await;
        let uids: Vec<String> = self
            .group_features(group)
            .await?
            .into_iter()
            .map(|feature| feature.uid)
            .collect();
        for uid in &uids {
            if enabled {
                self.store.enable(uid).await?;
            } else {
                self.store.disable(uid).await?;
            }
        }
        info!(enabled, count = uids.len(), "Feature group toggled");
        Ok(uids)
    }

    /// Apply `change` to the stored feature; it reports whether anything changed.
    async fn modify<F>(&self, uid: &str, change: F) -> Result<FeatureAction, DomainError>
    where
        F: FnOnce(&mut Feature) -> bool + Send,
    {
        Self::require_name("feature UID", uid)?;
        let _guard = self.lock.lock().await;
        let mut feature = self.store.get(uid).await?;
        if !change(&mut feature) {
            return Ok(FeatureAction::Unchanged);
        }
        self.store.update(feature).await?;
        info!(uid, "Feature updated");
        Ok(FeatureAction::Updated)
    }

    fn validate(&self, uid: &str, spec: &FeatureSpec) -> Result<(), DomainError> {
        Self::require_name("feature UID", uid)?;

        if let Some(body_uid) = &spec.uid
            && body_uid != uid
        {
            return Err(DomainError::invalid_spec(format!(
                "UID '{body_uid}' in body does not match '{uid}'"
            )));
        }

        if let Some(descriptor) = &spec.strategy {
            Self::require_name("strategy name", &descriptor.name)?;
            let strategy = self.strategies.get(&descriptor.name).map_err(|_| {
                DomainError::invalid_spec(format!("unknown strategy '{}'", descriptor.name))
            })?;
            strategy
                .validate(&StrategyParams::stored(&descriptor.params))
                .map_err(|e| {
                    DomainError::invalid_spec(format!("strategy '{}': {e}", descriptor.name))
                })?;
        }

        for permission in &spec.permissions {
            Self::require_name("permission", permission)?;
        }
        if let Some(group) = &spec.group {
            Self::require_name("group", group)?;
        }
        Ok(())
    }

    fn require_name(what: &str, value: &str) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid_spec(format!("{what} must not be blank")));
        }
        Ok(())
    }
}
