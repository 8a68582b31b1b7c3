//! Public models for the feature-toggles module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the feature-toggles module and its consumers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Caller-supplied parameters for a single flip check.
///
/// Scoped to one evaluation call and never persisted.
pub type FlipParams = HashMap<String, String>;

/// Strategy configured on a feature: a registered strategy name plus its stored parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlippingStrategy {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl FlippingStrategy {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A named toggle with enabled state, optional strategy and optional required permissions.
///
/// An empty `permissions` set means the feature is not gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub uid: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<FlippingStrategy>,
}

impl Feature {
    /// Creates a disabled feature with no description, group, permissions or strategy.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            enabled: false,
            description: None,
            group: None,
            permissions: BTreeSet::new(),
            strategy: None,
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: FlippingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// Administrative input for create-or-update.
///
/// The UID normally comes from the caller's path; when `uid` is also present in the
/// body it must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<FlippingStrategy>,
}

impl FeatureSpec {
    /// Builds the described feature under the given UID.
    #[must_use]
    pub fn into_feature(self, uid: impl Into<String>) -> Feature {
        Feature {
            uid: uid.into(),
            enabled: self.enabled,
            description: self.description,
            group: self.group,
            permissions: self.permissions,
            strategy: self.strategy,
        }
    }
}

impl From<Feature> for FeatureSpec {
    fn from(feature: Feature) -> Self {
        Self {
            uid: Some(feature.uid),
            enabled: feature.enabled,
            description: feature.description,
            group: feature.group,
            permissions: feature.permissions,
            strategy: feature.strategy,
        }
    }
}

/// Outcome of an administrative mutation. Returned to the caller, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureAction {
    Created,
    Updated,
    Deleted,
    Unchanged,
}

/// Permissions reported by an authorization manager.
///
/// `Unrestricted` and an empty `Granted` set are different answers: the first exempts the
/// caller from permission checks, the second means the caller holds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "permissions", rename_all = "snake_case")]
pub enum PermissionSet {
    Unrestricted,
    Granted(BTreeSet<String>),
}

impl PermissionSet {
    #[must_use]
    pub fn granted<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Granted(permissions.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// True when the caller holds at least one of `required`.
    #[must_use]
    pub fn intersects(&self, required: &BTreeSet<String>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Granted(held) => !held.is_disjoint(required),
        }
    }

    /// True when the caller holds every permission in `required`.
    #[must_use]
    pub fn covers(&self, required: &BTreeSet<String>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Granted(held) => required.is_subset(held),
        }
    }
}

/// Cache section of [`FeaturesStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub cache_type: String,
    pub cached_features: Vec<String>,
}

/// Read-only summary of the current toggle runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesStatus {
    pub store_type: String,
    pub cache: Option<CacheStatus>,
    pub autocreate: bool,
    pub security_enabled: bool,
    pub authorization_manager: Option<String>,
    pub features_count: usize,
    pub groups_count: usize,
}

/// Permissions known to the configured authorization manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub authorization_manager: String,
    pub current_user_permissions: PermissionSet,
    pub all_permissions: PermissionSet,
}
