use std::collections::HashSet;

use async_trait::async_trait;

use super::{FlipStrategy, StrategyParams};
use crate::domain::error::DomainError;
use crate::domain::store::FeatureStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    Allow,
    Deny,
}

/// Matches a caller-supplied value against a list stored on the feature.
///
/// The caller's value may name several alternatives (`"a | b"`); in allow mode any
/// listed alternative passes, in deny mode any listed alternative fails.
#[derive(Debug, Clone)]
pub struct ListFilterStrategy {
    name: &'static str,
    list_param: &'static str,
    caller_param: &'static str,
    mode: FilterMode,
}

impl ListFilterStrategy {
    /// `grantedClients` vs caller `clientHostName`.
    #[must_use]
    pub fn client_filter() -> Self {
        Self {
            name: "ClientFilter",
            list_param: "grantedClients",
            caller_param: "clientHostName",
            mode: FilterMode::Allow,
        }
    }

    /// `grantedServers` vs caller `serverHostName`.
    #[must_use]
    pub fn server_filter() -> Self {
        Self {
            name: "ServerFilter",
            list_param: "grantedServers",
            caller_param: "serverHostName",
            mode: FilterMode::Allow,
        }
    }

    /// `whitelist` vs caller `clientHostName`.
    #[must_use]
    pub fn white_list() -> Self {
        Self {
            name: "WhiteList",
            list_param: "whitelist",
            caller_param: "clientHostName",
            mode: FilterMode::Allow,
        }
    }

    /// `blacklist` vs caller `clientHostName`; listed callers are refused.
    #[must_use]
    pub fn black_list() -> Self {
        Self {
            name: "BlackList",
            list_param: "blacklist",
            caller_param: "clientHostName",
            mode: FilterMode::Deny,
        }
    }
}

#[async_trait]
impl FlipStrategy for ListFilterStrategy {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, stored: &StrategyParams) -> Result<(), DomainError> {
        stored.alternatives(self.list_param).map(|_| ())
    }

    async fn evaluate(
        &self,
        _uid: &str,
        params: &StrategyParams,
        _store: &dyn FeatureStore,
    ) -> Result<bool, DomainError> {
        let listed: HashSet<&str> = params.alternatives(self.list_param)?.into_iter().collect();
        let candidates = params.alternatives(self.caller_param)?;
        let hit = candidates.iter().any(|c| listed.contains(c));
        Ok(match self.mode {
            FilterMode::Allow => hit,
            FilterMode::Deny => !hit,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::infra::InMemoryFeatureStore;

    fn params(stored: &[(&str, &str)], supplied: &[(&str, &str)]) -> StrategyParams {
        let stored: BTreeMap<String, String> = stored
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let supplied: HashMap<String, String> = supplied
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        StrategyParams::merge(&stored, &supplied)
    }

    #[tokio::test]
    async fn client_filter_matches_granted_host() {
        let store = InMemoryFeatureStore::new();
        let strategy = ListFilterStrategy::client_filter();
        let stored = [("grantedClients", "pierre,paul")];

        let ok = params(&stored, &[("clientHostName", "paul")]);
        assert!(strategy.evaluate("f", &ok, &store).await.unwrap());

        let ko = params(&stored, &[("clientHostName", "jacques")]);
        assert!(!strategy.evaluate("f", &ko, &store).await.unwrap());
    }

    #[tokio::test]
    async fn alternatives_spelled_either_way_agree() {
        let store = InMemoryFeatureStore::new();
        let strategy = ListFilterStrategy::client_filter();
        let stored = [("grantedClients", "paul")];

        let human = params(&stored, &[("clientHostName", "jacques or paul")]);
        let internal = params(&stored, &[("clientHostName", "jacques|paul")]);
        assert!(strategy.evaluate("f", &human, &store).await.unwrap());
        assert!(strategy.evaluate("f", &internal, &store).await.unwrap());
    }

    #[tokio::test]
    async fn missing_caller_parameter_is_invalid() {
        let store = InMemoryFeatureStore::new();
        let strategy = ListFilterStrategy::server_filter();
        let p = params(&[("grantedServers", "srv1")], &[]);

        let err = strategy.evaluate("f", &p, &store).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidParameter { name, .. } if name == "serverHostName"));
    }

    #[tokio::test]
    async fn black_list_refuses_listed_callers() {
        let store = InMemoryFeatureStore::new();
        let strategy = ListFilterStrategy::black_list();
        let stored = [("blacklist", "evil|worse")];

        let listed = params(&stored, &[("clientHostName", "evil")]);
        assert!(!strategy.evaluate("f", &listed, &store).await.unwrap());

        let other = params(&stored, &[("clientHostName", "nice")]);
        assert!(strategy.evaluate("f", &other, &store).await.unwrap());
    }

    #[test]
    fn validate_requires_stored_list() {
        let strategy = ListFilterStrategy::white_list();
        assert!(strategy.validate(&params(&[("whitelist", "a")], &[])).is_ok());
        assert!(strategy.validate(&params(&[], &[])).is_err());
    }
}
