//! Authorization manager contract.

use async_trait::async_trait;
use feature_toggles_sdk::PermissionSet;

use super::error::DomainError;

/// Supplies the caller's permissions and the universe of known permissions.
///
/// Implementations are swapped wholesale when security configuration changes.
#[async_trait]
pub trait AuthorizationManager: Send + Sync {
    fn manager_type(&self) -> String;

    /// Permissions of the current caller. `PermissionSet::Unrestricted` exempts the caller
    /// from permission checks.
    ///
    /// # Errors
    ///
    /// Backend failures; they are never turned into a denial.
    async fn current_user_permissions(&self) -> Result<PermissionSet, DomainError>;

    /// # Errors
    ///
    /// Backend failures.
    async fn all_permissions(&self) -> Result<PermissionSet, DomainError>;
}
