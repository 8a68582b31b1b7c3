//! Error types for the feature-toggles SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureTogglesError {
    #[error("Feature not found: {uid}")]
    NotFound { uid: String },

    #[error("Feature group not found: {group}")]
    GroupNotFound { group: String },

    #[error("Feature already exists: {uid}")]
    AlreadyExists { uid: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid feature spec: {message}")]
    InvalidSpec { message: String },

    #[error("Security is not available: no authorization manager configured")]
    SecurityUnavailable,

    #[error("Internal error")]
    Internal,
}

impl FeatureTogglesError {
    #[must_use]
    pub fn not_found(uid: impl Into<String>) -> Self {
        Self::NotFound { uid: uid.into() }
    }

    #[must_use]
    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    #[must_use]
    pub fn already_exists(uid: impl Into<String>) -> Self {
        Self::AlreadyExists { uid: uid.into() }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
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
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn security_unavailable() -> Self {
        Self::SecurityUnavailable
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_group_not_found(&self) -> bool {
        matches!(self, Self::GroupNotFound { .. })
    }

    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    #[must_use]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    #[must_use]
    pub fn is_invalid_spec(&self) -> bool {
        matches!(self, Self::InvalidSpec { .. })
    }

    #[must_use]
    pub fn is_security_unavailable(&self) -> bool {
        matches!(self, Self::SecurityUnavailable)
    }
}
