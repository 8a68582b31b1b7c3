use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use super::{FlipStrategy, StrategyParams};
use crate::domain::error::DomainError;
use crate::domain::store::FeatureStore;

const RELEASE_DATE: &str = "releaseDate";

/// Format of the `releaseDate` parameter, interpreted as UTC.
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d-%H:%M";

/// Turns the feature on from `releaseDate` onwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseDateStrategy;

impl ReleaseDateStrategy {
    fn release_date(params: &StrategyParams) -> Result<NaiveDateTime, DomainError> {
        let raw = params.required(RELEASE_DATE)?;
        NaiveDateTime::parse_from_str(raw.trim(), RELEASE_DATE_FORMAT).map_err(|e| {
            DomainError::invalid_parameter(
                RELEASE_DATE,
                format!("'{raw}' does not match {RELEASE_DATE_FORMAT}: {e}"),
            )
        })
    }
}

#[async_trait]
impl FlipStrategy for ReleaseDateStrategy {
    fn name(&self) -> &str {
        "ReleaseDate"
    }

    fn validate(&self, stored: &StrategyParams) -> Result<(), DomainError> {
        Self::release_date(stored).map(|_| ())
    }

    async fn evaluate(
        &self,
        _uid: &str,
        params: &StrategyParams,
        _store: &dyn FeatureStore,
    ) -> Result<bool, DomainError> {
        let release = Self::release_date(params)?;
        Ok(Utc::now().naive_utc() >= release)
    }
}
