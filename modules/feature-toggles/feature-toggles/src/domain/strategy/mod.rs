//! Flip strategies: pluggable logic that further restricts an enabled feature based on
//! stored and caller-supplied parameters.

mod expression;
mod filter;
mod params;
mod ponderation;
mod release_date;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::DomainError;
use super::store::FeatureStore;

pub use expression::{Expression, ExpressionStrategy};
pub use filter::ListFilterStrategy;
pub use params::{ALTERNATIVE_TOKEN, DISJUNCTION, StrategyParams, normalize_value, split_alternatives};
pub use ponderation::PonderationStrategy;
pub use release_date::{RELEASE_DATE_FORMAT, ReleaseDateStrategy};

/// A named decision procedure attached to features.
#[async_trait]
pub trait FlipStrategy: Send + Sync {
    /// Registry name, as written in a feature's strategy descriptor.
    fn name(&self) -> &str;

    /// Check the parameters stored on a feature when it is administered.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidParameter` if a required stored parameter is missing or malformed.
    fn validate(&self, _stored: &StrategyParams) -> Result<(), DomainError> {
        Ok(())
    }

    /// Decide whether the feature `uid` is on for the merged, normalized parameters.
    /// `store` resolves other features for strategies that depend on them.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidParameter` for missing or malformed parameters; store errors
    /// propagate.
    async fn evaluate(
        &self,
        uid: &str,
        params: &StrategyParams,
        store: &dyn FeatureStore,
    ) -> Result<bool, DomainError>;
}

/// Strategies addressable by name.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn FlipStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StrategyRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// `ClientFilter`, `ServerFilter`, `WhiteList`, `BlackList`, `Ponderation`,
    /// `ReleaseDate` and `Expression`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ListFilterStrategy::client_filter()));
        registry.register(Arc::new(ListFilterStrategy::server_filter()));
        registry.register(Arc::new(ListFilterStrategy::white_list()));
        registry.register(Arc::new(ListFilterStrategy::black_list()));
        registry.register(Arc::new(PonderationStrategy));
        registry.register(Arc::new(ReleaseDateStrategy));
        registry.register(Arc::new(ExpressionStrategy));
        registry
    }

    /// Adds a strategy, replacing any previous one with the same name.
    pub fn register(&mut self, strategy: Arc<dyn FlipStrategy>) {
        self.strategies.insert(strategy.name().to_owned(), strategy);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Sorted strategy names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }

    /// # Errors
    ///
    /// `DomainError::Configuration` if no strategy has this name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn FlipStrategy>, DomainError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::configuration(format!("unknown flipping strategy '{name}'")))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = StrategyRegistry::default();
        assert_eq!(
            registry.names(),
            vec![
                "BlackList",
                "ClientFilter",
                "Expression",
                "Ponderation",
                "ReleaseDate",
                "ServerFilter",
                "WhiteList",
            ]
        );
    }

    #[test]
    fn unknown_strategy_is_configuration_error() {
        let registry = StrategyRegistry::empty();
        assert!(!registry.contains("Ponderation"));
        let err = registry.get("Ponderation").err().unwrap();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn register_replaces_by_name() {
        let mut registry = StrategyRegistry::empty();
        registry.register(Arc::new(PonderationStrategy));
        registry.register(Arc::new(PonderationStrategy));
        assert_eq!(registry.names(), vec!["Ponderation"]);
    }
}
