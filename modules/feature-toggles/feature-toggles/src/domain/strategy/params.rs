use std::collections::{BTreeMap, HashMap};

use crate::domain::error::DomainError;

/// Internal separator between acceptable alternatives in a parameter value.
pub const DISJUNCTION: char = '|';

/// Human-readable spelling of [`DISJUNCTION`] accepted from callers, as a whole word
/// in any case: `"pierre or paul"` is read as `"pierre | paul"`.
pub const ALTERNATIVE_TOKEN: &str = "or";

/// Rewrite every whole-word [`ALTERNATIVE_TOKEN`] into [`DISJUNCTION`].
///
/// Words merely containing the token (`"order"`, `"floor"`) are left alone. Whitespace
/// is normalized the same way for every value: ends trimmed, inner runs collapsed to a
/// single space.
#[must_use]
pub fn normalize_value(value: &str) -> String {
    let disjunction = DISJUNCTION.to_string();
    value
        .split_whitespace()
        .map(|word| {
            if word.eq_ignore_ascii_case(ALTERNATIVE_TOKEN) {
                disjunction.as_str()
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a list value on `|` or `,`, trimming blanks.
pub fn split_alternatives(value: &str) -> impl Iterator<Item = &str> {
    value
        .split([DISJUNCTION, ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parameters seen by a strategy for one evaluation: the feature's stored parameters
/// overridden by the caller's, every value normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyParams {
    values: HashMap<String, String>,
}

impl StrategyParams {
    #[must_use]
    pub fn merge(stored: &BTreeMap<String, String>, supplied: &HashMap<String, String>) -> Self {
        let values = stored
            .iter()
            .chain(supplied.iter())
            .map(|(k, v)| (k.clone(), normalize_value(v)))
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn stored(stored: &BTreeMap<String, String>) -> Self {
        Self::merge(stored, &HashMap::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// # Errors
    ///
    /// `DomainError::InvalidParameter` if the parameter is absent or blank.
    pub fn required(&self, name: &str) -> Result<&str, DomainError> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(DomainError::invalid_parameter(
                name,
                "required parameter is missing",
            )),
        }
    }

    /// The alternatives listed in a required parameter.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidParameter` if the parameter is absent or lists nothing.
    pub fn alternatives(&self, name: &str) -> Result<Vec<&str>, DomainError> {
        let values: Vec<&str> = split_alternatives(self.required(name)?).collect();
        if values.is_empty() {
            return Err(DomainError::invalid_parameter(name, "no values listed"));
        }
        Ok(values)
    }
}
