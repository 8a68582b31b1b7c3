#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Feature toggles: a write-through cache proxy over a feature store plus the flip
//! evaluation engine that combines stored state, permissions and strategies.

pub use feature_toggles_sdk::*;

pub mod config;
pub mod domain;
pub mod infra;
pub mod local_client;
pub mod runtime;

pub use config::{CacheConfig, FeatureTogglesConfig, PermissionMatch};
pub use domain::admin::FeatureAdminService;
pub use domain::authorization::AuthorizationManager;
pub use domain::cache::FeatureCache;
pub use domain::cache_proxy::CacheProxy;
pub use domain::error::DomainError;
pub use domain::flip::FlipEngine;
pub use domain::store::FeatureStore;
pub use domain::strategy::{FlipStrategy, StrategyRegistry};
pub use infra::{InMemoryFeatureCache, InMemoryFeatureStore, StaticAuthorizationManager};
pub use local_client::LocalClient;
pub use runtime::FeatureToggles;
