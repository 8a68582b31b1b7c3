//! Authorization manager with fixed permission sets, for configuration-driven setups and tests.

use async_trait::async_trait;
use feature_toggles_sdk::PermissionSet;

use crate::domain::authorization::AuthorizationManager;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub struct StaticAuthorizationManager {
    current_user: PermissionSet,
    all: PermissionSet,
}

impl StaticAuthorizationManager {
    #[must_use]
    pub fn new(current_user: PermissionSet, all: PermissionSet) -> Self {
        Self { current_user, all }
    }

    /// The caller holds exactly `permissions`; the known universe is the same set.
    #[must_use]
    pub fn granting<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let granted = PermissionSet::granted(permissions);
        Self::new(granted.clone(), granted)
    }

    /// The caller is exempt from permission checks.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::new(PermissionSet::Unrestricted, PermissionSet::Unrestricted)
    }

    #[must_use]
    pub fn with_all_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all = PermissionSet::granted(permissions);
        self
    }
}

#[async_trait]
impl AuthorizationManager for StaticAuthorizationManager {
    fn manager_type(&self) -> String {
        "StaticAuthorizationManager".to_owned()
    }

    async fn current_user_permissions(&self) -> Result<PermissionSet, DomainError> {
        Ok(self.current_user.clone())
    }

    async fn all_permissions(&self) -> Result<PermissionSet, DomainError> {
        Ok(self.all.clone())
    }
}
