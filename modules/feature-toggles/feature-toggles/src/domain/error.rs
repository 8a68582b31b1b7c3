//! Domain error types for the feature-toggles module.

use feature_toggles_sdk::FeatureTogglesError;
use thiserror::Error;

/// Domain-level errors.
///
/// Store, cache, strategy and authorization collaborators all report through this type
/// so that failures propagate to the caller unchanged.
#[derive(Error, Debug)]
pub enum DomainError {
    /// The feature UID is unknown.
    #[error("Feature not found: {0}")]
    NotFound(String),

    /// No feature belongs to the named group.
    #[error("Feature group not found: {0}")]
    GroupNotFound(String),

    /// A feature with the same UID already exists.
    #[error("Feature already exists: {0}")]
    AlreadyExists(String),

    /// Unknown strategy or otherwise unusable configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A strategy parameter is missing or malformed.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// An administrative request was rejected before reaching the store.
    #[error("Invalid feature spec: {0}")]
    InvalidSpec(String),

    /// Security information was requested but no authorization manager is configured.
    #[error("Security unavailable: no authorization manager configured")]
    SecurityUnavailable,

    /// An opaque failure from a store, cache or authorization backend.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn not_found(uid: impl Into<String>) -> Self {
        Self::NotFound(uid.into())
    }

    #[must_use]
    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound(group.into())
    }

    #[must_use]
    pub fn already_exists(uid: impl Into<String>) -> Self {
        Self::AlreadyExists(uid.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec(message.into())
    }
}

impl From<DomainError> for FeatureTogglesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(uid) => Self::not_found(uid),
            DomainError::GroupNotFound(group) => Self::group_not_found(group),
            DomainError::AlreadyExists(uid) => Self::already_exists(uid),
            DomainError::Configuration(message) => Self::configuration(message),
            DomainError::InvalidParameter { name, message } => {
                Self::invalid_parameter(name, message)
            }
            DomainError::InvalidSpec(message) => Self::invalid_spec(message),
            DomainError::SecurityUnavailable => Self::security_unavailable(),
            DomainError::Internal(_) => Self::internal(),
        }
    }
}
