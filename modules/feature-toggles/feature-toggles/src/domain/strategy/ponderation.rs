use async_trait::async_trait;

use super::{FlipStrategy, StrategyParams};
use crate::domain::error::DomainError;
use crate::domain::store::FeatureStore;

const WEIGHT: &str = "weight";

/// Turns the feature on for a random share of checks given by `weight` in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PonderationStrategy;

impl PonderationStrategy {
    fn weight(params: &StrategyParams) -> Result<f64, DomainError> {
        let raw = params.required(WEIGHT)?;
        let weight: f64 = raw
            .trim()
            .parse()
            .map_err(|_| DomainError::invalid_parameter(WEIGHT, format!("'{raw}' is not a number")))?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(DomainError::invalid_parameter(
                WEIGHT,
                format!("{weight} is outside [0, 1]"),
            ));
        }
        Ok(weight)
    }
}

#[async_trait]
impl FlipStrategy for PonderationStrategy {
    fn name(&self) -> &str {
        "Ponderation"
    }

    fn validate(&self, stored: &StrategyParams) -> Result<(), DomainError> {
        Self::weight(stored).map(|_| ())
    }

    async fn evaluate(
        &self,
        _uid: &str,
        params: &StrategyParams,
        _store: &dyn FeatureStore,
    ) -> Result<bool, DomainError> {
        let weight = Self::weight(params)?;
        Ok(rand::random::<f64>() < weight)
    }
}
