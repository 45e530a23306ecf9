// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// Only types used by more than one module live here. Module-local types stay with their module.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which branch of a test result a likelihood ratio applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LrKind {
    Positive,
    Negative,
}

impl LrKind {
    pub const ALL: [LrKind; 2] = [LrKind::Positive, LrKind::Negative];
}

impl fmt::Display for LrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LrKind::Positive => write!(f, "LR+"),
            LrKind::Negative => write!(f, "LR-"),
        }
    }
}

/// A positive/negative likelihood ratio pair.
///
/// This is passed by value everywhere; the session never aliases the pair that is in force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodRatios {
    pub positive: f64,
    pub negative: f64,
}

impl LikelihoodRatios {
    #[inline]
    pub fn get(&self, kind: LrKind) -> f64 {
        match kind {
            LrKind::Positive => self.positive,
            LrKind::Negative => self.negative,
        }
    }

    /// Returns a copy with only `kind` replaced.
    #[inline]
    pub fn with(self, kind: LrKind, value: f64) -> Self {
        match kind {
            LrKind::Positive => Self {
                positive: value,
                ..self
            },
            LrKind::Negative => Self {
                negative: value,
                ..self
            },
        }
    }
}

/// Rejected user input. Prior state is always preserved when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Invalid age '{0}'. Expected a whole number of years.")]
    InvalidAge(String),
    #[error("Age cannot be negative (got {0}).")]
    NegativeAge(i64),
    #[error("Invalid likelihood ratio '{0}'. Expected a finite number.")]
    InvalidLikelihoodRatio(String),
    #[error("Likelihood ratio must be greater than zero (got {0}).")]
    NonPositiveLikelihoodRatio(f64),
    #[error("Clinical probability must be between 0 and 100 percent (got {0}).")]
    ProbabilityOutOfRange(f64),
}

/// Parses user-typed likelihood-ratio text.
///
/// Accepts any finite, strictly positive decimal. `inf` and `NaN`, which `f64::from_str`
/// would otherwise admit, are rejected as non-numeric.
pub fn parse_likelihood_ratio(raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| InputError::InvalidLikelihoodRatio(trimmed.to_string()))?;
    validate_likelihood_ratio(value).map_err(|err| match err {
        InputError::InvalidLikelihoodRatio(_) => {
            InputError::InvalidLikelihoodRatio(trimmed.to_string())
        }
        other => other,
    })
}

pub fn validate_likelihood_ratio(value: f64) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::InvalidLikelihoodRatio(value.to_string()));
    }
    if value <= 0.0 {
        return Err(InputError::NonPositiveLikelihoodRatio(value));
    }
    Ok(value)
}

/// Checks a clinical probability expressed on the 0-100 scale.
pub fn validate_probability_percent(percent: f64) -> Result<f64, InputError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(InputError::ProbabilityOutOfRange(percent));
    }
    Ok(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_replaces_only_the_requested_ratio() {
        let ratios = LikelihoodRatios {
            positive: 7.1,
            negative: 0.1,
        };
        let edited = ratios.with(LrKind::Positive, 10.0);
        assert_eq!(edited.positive, 10.0);
        assert_eq!(edited.negative, 0.1);
        assert_eq!(edited.get(LrKind::Negative), ratios.get(LrKind::Negative));
    }

    #[test]
    fn parse_likelihood_ratio_accepts_trimmed_decimals() {
        assert_eq!(parse_likelihood_ratio(" 10 ").unwrap(), 10.0);
        assert_eq!(parse_likelihood_ratio("0.25").unwrap(), 0.25);
    }

    #[test]
    fn parse_likelihood_ratio_rejects_non_numeric_and_non_finite() {
        assert_eq!(
            parse_likelihood_ratio("abc"),
            Err(InputError::InvalidLikelihoodRatio("abc".to_string()))
        );
        assert_eq!(
            parse_likelihood_ratio("inf"),
            Err(InputError::InvalidLikelihoodRatio("inf".to_string()))
        );
        assert!(matches!(
            parse_likelihood_ratio("NaN"),
            Err(InputError::InvalidLikelihoodRatio(_))
        ));
        assert!(matches!(
            parse_likelihood_ratio(""),
            Err(InputError::InvalidLikelihoodRatio(_))
        ));
    }

    #[test]
    fn parse_likelihood_ratio_rejects_zero_and_negative() {
        assert_eq!(
            parse_likelihood_ratio("0"),
            Err(InputError::NonPositiveLikelihoodRatio(0.0))
        );
        assert_eq!(
            parse_likelihood_ratio("-2"),
            Err(InputError::NonPositiveLikelihoodRatio(-2.0))
        );
    }

    #[test]
    fn probability_percent_bounds_are_inclusive() {
        assert!(validate_probability_percent(0.0).is_ok());
        assert!(validate_probability_percent(100.0).is_ok());
        assert!(validate_probability_percent(100.5).is_err());
        assert!(validate_probability_percent(-0.1).is_err());
        assert!(validate_probability_percent(f64::NAN).is_err());
    }
}
