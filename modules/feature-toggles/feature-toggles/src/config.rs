use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `FEATURE_TOGGLES__CACHE__TTL_SECS=60`.
pub const ENV_PREFIX: &str = "FEATURE_TOGGLES__";

/// How a caller's permissions must relate to a feature's required permissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMatch {
    /// Every required permission is held.
    #[default]
    All,
    /// At least one required permission is held.
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Entry lifetime in seconds. Zero keeps entries until they are invalidated.
    #[serde(default)]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: 0,
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTogglesConfig {
    /// Create a disabled feature on the fly when a check names an unknown UID.
    #[serde(default)]
    pub autocreate: bool,
    #[serde(default)]
    pub permission_match: PermissionMatch,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl FeatureTogglesConfig {
    /// Load configuration from defaults, an optional YAML file and `FEATURE_TOGGLES__*`
    /// environment variables, later sources overriding earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if the file cannot be parsed or a value
    /// has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, DomainError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        Self::from_figment(&figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, DomainError> {
        figment
            .extract()
            .map_err(|e| DomainError::configuration(format!("invalid feature toggles config: {e}")))
    }
}
