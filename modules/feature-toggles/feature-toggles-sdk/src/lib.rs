#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Feature Toggles SDK.
//!
//! This crate defines **transport-agnostic** types used by the `feature-toggles` module.
//!
//! # Public API
//!
//! - [`FeatureTogglesClientV1`]: client trait for flip checks and feature administration.
//! - [`Feature`], [`FeatureSpec`], [`FlippingStrategy`]: feature definitions.
//! - [`FeatureAction`]: outcome of an administrative mutation.
//! - [`PermissionSet`]: three-state permission answer from an authorization manager.
//! - [`FeatureTogglesError`]: error kinds surfaced to consumers.

pub mod api;
pub mod errors;
pub mod models;

pub use api::FeatureTogglesClientV1;
pub use errors::FeatureTogglesError;
pub use models::{
    CacheStatus, Feature, FeatureAction, FeatureSpec, FeaturesStatus, FlipParams,
    FlippingStrategy, PermissionSet, SecurityInfo,
};
