//! Structural checks applied to merged country candidates.

use std::collections::BTreeMap;
use std::fmt;

use super::NewCountry;

/// Field-level violations for a single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub errors: BTreeMap<String, String>,
}

impl ValidationError {
    fn add(&mut self, field: &str, reason: &str) {
        self.errors.insert(field.to_string(), reason.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .errors
            .iter()
            .map(|(field, reason)| format!("{} {}", field, reason))
            .collect::<Vec<_>>();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Checks a candidate: name non-empty, population positive, currency code present.
pub fn validate(candidate: &NewCountry) -> Result<(), ValidationError> {
    let mut violations = ValidationError::default();

    if candidate.name.trim().is_empty() {
        violations.add("name", "is required");
    }
    if candidate.population <= 0 {
        violations.add("population", "must be greater than 0");
    }
    match candidate.currency_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {}
        _ => violations.add("currency_code", "is required"),
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
