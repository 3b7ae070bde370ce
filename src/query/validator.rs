//! Query intent validator.
//!
//! Checks a parsed [`CommandIntent`] against the vocabulary of known
//! category names and domain bounds, producing a [`ValidatedIntent`] that
//! downstream stages can rely on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::types::{CommandIntent, ValidatedIntent};

/// Upper bound on amount filters. Anything beyond this is a typo, not a
/// payment.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// The set of known category names, fetched from the store per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    names: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order, for deterministic listings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Vocabulary {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Validates command intents against a vocabulary.
///
/// Checks run in a fixed left-to-right order so the reported error is
/// reproducible: category names first, then the date range, then amount
/// filters. The first failing check wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentValidator;

impl IntentValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        intent: &CommandIntent,
        vocabulary: &Vocabulary,
    ) -> Result<ValidatedIntent, ValidationError> {
        for name in intent.categories() {
            if !vocabulary.contains(name) {
                return Err(ValidationError::UnknownEntity(name.to_string()));
            }
        }

        if let Some(range) = intent.range() {
            if range.start > range.end {
                return Err(ValidationError::InvalidRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }

        if let Some(amounts) = intent.amounts() {
            for (label, bound) in [("min", amounts.min), ("max", amounts.max)] {
                if let Some(value) = bound {
                    if !value.is_finite() || !(0.0..=MAX_AMOUNT).contains(&value) {
                        return Err(ValidationError::OutOfRange {
                            detail: format!("{label}={value} must be between 0 and {MAX_AMOUNT}"),
                        });
                    }
                }
            }
            if let (Some(min), Some(max)) = (amounts.min, amounts.max) {
                if min > max {
                    return Err(ValidationError::OutOfRange {
                        detail: format!("min={min} exceeds max={max}"),
                    });
                }
            }
        }

        Ok(ValidatedIntent::new(intent.clone()))
    }
}
