// ========================================================================================
//                         Odds-Form Bayesian Update
// ========================================================================================
//
// post-test odds = pre-test odds x likelihood ratio
//
// Every update goes through the two explicit conversions (probability -> odds -> probability)
// so that the numbers a report narrates are the numbers that were actually computed.

use crate::types::LikelihoodRatios;
use serde::{Deserialize, Serialize};

/// `p / (1 - p)`. Returns `+inf` at `p = 1`.
#[inline]
pub fn probability_to_odds(probability: f64) -> f64 {
    probability / (1.0 - probability)
}

/// `odds / (1 + odds)`.
#[inline]
pub fn odds_to_probability(odds: f64) -> f64 {
    odds / (1.0 + odds)
}

/// Every intermediate of one update, in the order they are computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateTrace {
    pub pre_test_probability: f64,
    pub pre_test_odds: f64,
    pub likelihood_ratio: f64,
    pub post_test_odds: f64,
    pub post_test_probability: f64,
}

/// Runs the update and records each step.
///
/// Degenerate inputs never produce a non-finite probability:
/// * `p <= 0` gives odds of zero and a post-test probability of exactly zero.
/// * `p >= 1` saturates to a post-test probability of one (the odds are `+inf`).
/// * A finite pre-test probability with an extreme ratio whose posterior odds overflow
///   also saturates to one.
pub fn trace_update(pre_test_probability: f64, likelihood_ratio: f64) -> UpdateTrace {
    if pre_test_probability <= 0.0 {
        return UpdateTrace {
            pre_test_probability,
            pre_test_odds: 0.0,
            likelihood_ratio,
            post_test_odds: 0.0,
            post_test_probability: 0.0,
        };
    }
    if pre_test_probability >= 1.0 {
        log::debug!(
            "Pre-test probability {pre_test_probability} is saturated; post-test probability pinned to 1"
        );
        return UpdateTrace {
            pre_test_probability,
            pre_test_odds: f64::INFINITY,
            likelihood_ratio,
            post_test_odds: f64::INFINITY,
            post_test_probability: 1.0,
        };
    }

    let pre_test_odds = probability_to_odds(pre_test_probability);
    let post_test_odds = pre_test_odds * likelihood_ratio;
    let post_test_probability = if post_test_odds.is_finite() {
        odds_to_probability(post_test_odds)
    } else {
        log::debug!("Post-test odds overflowed for LR {likelihood_ratio}; saturating to 1");
        1.0
    };

    UpdateTrace {
        pre_test_probability,
        pre_test_odds,
        likelihood_ratio,
        post_test_odds,
        post_test_probability,
    }
}

/// Post-test probability for a single likelihood ratio.
#[inline]
pub fn post_test_probability(pre_test_probability: f64, likelihood_ratio: f64) -> f64 {
    trace_update(pre_test_probability, likelihood_ratio).post_test_probability
}

/// Both branches of a test result. Changes are signed and relative to the pre-test probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostTestProbabilities {
    pub positive_probability: f64,
    pub negative_probability: f64,
    pub positive_change: f64,
    pub negative_change: f64,
}

pub fn compute_both(pre_test_probability: f64, ratios: LikelihoodRatios) -> PostTestProbabilities {
    let positive_probability = post_test_probability(pre_test_probability, ratios.positive);
    let negative_probability = post_test_probability(pre_test_probability, ratios.negative);
    PostTestProbabilities {
        positive_probability,
        negative_probability,
        positive_change: positive_probability - pre_test_probability,
        negative_change: negative_probability - pre_test_probability,
    }
}
