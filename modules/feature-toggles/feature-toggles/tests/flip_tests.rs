#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for flip checks through the runtime and the local client

mod common;

use std::sync::Arc;

use common::{create_toggles, create_toggles_with, enabled_spec, params};
use feature_toggles::{
    FeatureAction, FeatureSpec, FeatureTogglesClientV1, FeatureTogglesConfig,
    FeatureTogglesError, FlippingStrategy, LocalClient, PermissionMatch,
    StaticAuthorizationManager,
};

// =============================================================================
// Lookup and stored state
// =============================================================================

#[tokio::test]
async fn test_unknown_uid_fails_loudly() {
    let client = LocalClient::new(create_toggles());

    let err = client.check("nowhere").await.unwrap_err();
    assert_eq!(err, FeatureTogglesError::not_found("nowhere"));
}

#[tokio::test]
async fn test_cleared_store_scenario() {
    let client = LocalClient::new(create_toggles());
    assert!(client.list_features().await.unwrap().is_empty());

    let action = client
        .create_or_update_feature("foo", enabled_spec())
        .await
        .unwrap();
    assert_eq!(action, FeatureAction::Created);
    assert!(client.check("foo").await.unwrap());

    client.disable_feature("foo").await.unwrap();
    assert!(!client.check("foo").await.unwrap());
}

#[tokio::test]
async fn test_disabled_wins_over_strategy_and_permissions() {
    let toggles = create_toggles();
    toggles.set_authorization(Arc::new(StaticAuthorizationManager::unrestricted()));
    let client = LocalClient::new(toggles);

    client
        .create_or_update_feature(
            "f",
            FeatureSpec {
                enabled: false,
                permissions: ["A".to_owned()].into(),
                strategy: Some(FlippingStrategy::new("Ponderation").with_param("weight", "1")),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();

    for _ in 0..10 {
        assert!(!client.check("f").await.unwrap());
    }
}

#[tokio::test]
async fn test_create_or_update_is_idempotent() {
    let client = LocalClient::new(create_toggles());

    let first = client
        .create_or_update_feature("f", enabled_spec())
        .await
        .unwrap();
    let second = client
        .create_or_update_feature("f", enabled_spec())
        .await
        .unwrap();

    assert_eq!(first, FeatureAction::Created);
    assert_eq!(second, FeatureAction::Unchanged);
}

#[tokio::test]
async fn test_deleted_feature_is_not_found_even_if_cached() {
    let toggles = create_toggles();
    let client = LocalClient::new(toggles.clone());

    client
        .create_or_update_feature("f", enabled_spec())
        .await
        .unwrap();
    assert!(client.check("f").await.unwrap());
    let cached = toggles.status().await.unwrap().cache.unwrap();
    assert_eq!(cached.cached_features, vec!["f"]);

    assert_eq!(
        client.delete_feature("f").await.unwrap(),
        FeatureAction::Deleted
    );
    assert!(client.check("f").await.unwrap_err().is_not_found());
    assert!(client.get_feature("f").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_read_your_writes_through_cache() {
    let client = LocalClient::new(create_toggles());

    client
        .create_or_update_feature("f", enabled_spec())
        .await
        .unwrap();
    assert!(client.check("f").await.unwrap());

    for round in 0..20 {
        let enabled = round % 2 == 1;
        let action = client
            .create_or_update_feature(
                "f",
                FeatureSpec {
                    enabled,
                    ..FeatureSpec::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(action, FeatureAction::Updated);
        assert_eq!(client.check("f").await.unwrap(), enabled);
    }
}

// =============================================================================
// Permission gate
// =============================================================================

async fn gated_client(config: FeatureTogglesConfig, held: &[&str]) -> LocalClient {
    let toggles = create_toggles_with(config);
    toggles.set_authorization(Arc::new(StaticAuthorizationManager::granting(
        held.iter().copied(),
    )));
    let client = LocalClient::new(toggles);
    client
        .create_or_update_feature(
            "gated",
            FeatureSpec {
                enabled: true,
                permissions: ["A".to_owned(), "B".to_owned()].into(),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_partial_permissions_are_refused_by_default() {
    let client = gated_client(FeatureTogglesConfig::default(), &["A"]).await;
    assert!(!client.check("gated").await.unwrap());

    let client = gated_client(FeatureTogglesConfig::default(), &["A", "B"]).await;
    assert!(client.check("gated").await.unwrap());
}

#[tokio::test]
async fn test_any_mode_accepts_partial_permissions() {
    let config = FeatureTogglesConfig {
        permission_match: PermissionMatch::Any,
        ..FeatureTogglesConfig::default()
    };
    let client = gated_client(config.clone(), &["A"]).await;
    assert!(client.check("gated").await.unwrap());

    let client = gated_client(config, &[]).await;
    assert!(!client.check("gated").await.unwrap());
}

#[tokio::test]
async fn test_security_info_and_manager_swap() {
    let toggles = create_toggles();
    let client = LocalClient::new(toggles.clone());
    client
        .create_or_update_feature(
            "gated",
            FeatureSpec {
                enabled: true,
                permissions: ["A".to_owned()].into(),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();

    assert!(client.security_info().await.unwrap_err().is_security_unavailable());
    assert!(client.check("gated").await.unwrap());

    toggles.set_authorization(Arc::new(StaticAuthorizationManager::granting(["B"])));
    assert!(!client.check("gated").await.unwrap());
    let info = client.security_info().await.unwrap();
    assert_eq!(info.authorization_manager, "StaticAuthorizationManager");

    toggles.clear_authorization();
    assert!(client.check("gated").await.unwrap());
}

// =============================================================================
// Strategies and parameters
// =============================================================================

#[tokio::test]
async fn test_alternative_token_matches_disjunction() {
    let client = LocalClient::new(create_toggles());
    client
        .create_or_update_feature(
            "f",
            FeatureSpec {
                enabled: true,
                strategy: Some(
                    FlippingStrategy::new("ClientFilter").with_param("grantedClients", "pierre"),
                ),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();

    for (human, internal) in [
        ("paul or pierre", "paul|pierre"),
        ("paul OR jacques", "paul|jacques"),
    ] {
        let a = client
            .check_with("f", &params(&[("clientHostName", human)]))
            .await
            .unwrap();
        let b = client
            .check_with("f", &params(&[("clientHostName", internal)]))
            .await
            .unwrap();
        assert_eq!(a, b, "{human} vs {internal}");
    }
}

#[tokio::test]
async fn test_strategy_errors_surface_as_sdk_errors() {
    let toggles = create_toggles();
    let client = LocalClient::new(toggles.clone());
    client
        .create_or_update_feature(
            "f",
            FeatureSpec {
                enabled: true,
                strategy: Some(
                    FlippingStrategy::new("ServerFilter").with_param("grantedServers", "srv1"),
                ),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();

    let err = client.check("f").await.unwrap_err();
    assert_eq!(
        err,
        FeatureTogglesError::invalid_parameter("serverHostName", "required parameter is missing")
    );

    let err = client
        .create_or_update_feature(
            "g",
            FeatureSpec {
                enabled: true,
                strategy: Some(FlippingStrategy::new("Unheard")),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_invalid_spec());
}

#[tokio::test]
async fn test_expression_over_other_features() {
    let client = LocalClient::new(create_toggles());
    client
        .create_or_update_feature("login", enabled_spec())
        .await
        .unwrap();
    client
        .create_or_update_feature("beta", FeatureSpec::default())
        .await
        .unwrap();
    client
        .create_or_update_feature(
            "dashboard",
            FeatureSpec {
                enabled: true,
                strategy: Some(
                    FlippingStrategy::new("Expression").with_param("expression", "login & beta"),
                ),
                ..FeatureSpec::default()
            },
        )
        .await
        .unwrap();

    assert!(!client.check("dashboard").await.unwrap());
    client.enable_feature("beta").await.unwrap();
    assert!(client.check("dashboard").await.unwrap());
}

#[tokio::test]
async fn test_release_date_in_past_and_future() {
    let client = LocalClient::new(create_toggles());
    for (uid, date, expected) in [
        ("released", "2001-01-01-00:00", true),
        ("upcoming", "2999-12-31-23:59", false),
    ] {
        client
            .create_or_update_feature(
                uid,
                FeatureSpec {
                    enabled: true,
                    strategy: Some(
                        FlippingStrategy::new("ReleaseDate").with_param("releaseDate", date),
                    ),
                    ..FeatureSpec::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(client.check(uid).await.unwrap(), expected, "{uid}");
    }
}

// =============================================================================
// Autocreate and status
// =============================================================================

#[tokio::test]
async fn test_autocreate_registers_unknown_features() {
    let config = FeatureTogglesConfig {
        autocreate: true,
        ..FeatureTogglesConfig::default()
    };
    let client = LocalClient::new(create_toggles_with(config));

    assert!(!client.check("fresh").await.unwrap());
    let created = client.get_feature("fresh").await.unwrap();
    assert!(!created.enabled);

    let status = client.status().await.unwrap();
    assert!(status.autocreate);
    assert_eq!(status.features_count, 1);
}
