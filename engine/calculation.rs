use crate::bayes::{self, PostTestProbabilities};
use crate::catalog::TestId;
use crate::types::LikelihoodRatios;
use serde::Serialize;

/// One computed answer for a session. Rebuilt wholesale whenever an input changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationResult {
    /// Population prevalence for the patient's age band (0-100 scale).
    pub baseline_prevalence_percent: f64,
    /// Pre-test probability actually used (0-1 scale).
    pub clinical_probability: f64,
    pub test: TestId,
    pub likelihood_ratios_overridden: bool,
    #[serde(flatten)]
    pub post_test: PostTestProbabilities,
    /// The ratios in force when this result was computed.
    pub likelihood_ratios: LikelihoodRatios,
}

impl CalculationResult {
    pub fn compute(
        baseline_prevalence_percent: f64,
        clinical_probability: f64,
        test: TestId,
        likelihood_ratios: LikelihoodRatios,
        likelihood_ratios_overridden: bool,
    ) -> Self {
        let post_test = bayes::compute_both(clinical_probability, likelihood_ratios);
        log::debug!(
            "{test}: pre-test {clinical_probability:.4}, positive {:.4}, negative {:.4}",
            post_test.positive_probability,
            post_test.negative_probability
        );
        Self {
            baseline_prevalence_percent,
            clinical_probability,
            test,
            post_test,
            likelihood_ratios,
            likelihood_ratios_overridden,
        }
    }

    #[inline]
    pub fn test_name(&self) -> &'static str {
        self.test.name()
    }

    #[inline]
    pub fn positive_probability(&self) -> f64 {
        self.post_test.positive_probability
    }

    #[inline]
    pub fn negative_probability(&self) -> f64 {
        self.post_test.negative_probability
    }

    #[inline]
    pub fn positive_change(&self) -> f64 {
        self.post_test.positive_change
    }

    #[inline]
    pub fn negative_change(&self) -> f64 {
        self.post_test.negative_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn compute_derives_both_branches_from_the_given_ratios() {
        let ratios = LikelihoodRatios {
            positive: 4.2,
            negative: 0.2,
        };
        let result =
            CalculationResult::compute(8.0, 0.08, TestId::CsfAbeta4240Ratio, ratios, false);

        assert_eq!(result.test_name(), "CSF AB 42:40 ratio");
        assert_eq!(result.likelihood_ratios, ratios);
        assert_abs_diff_eq!(
            result.positive_probability(),
            bayes::post_test_probability(0.08, 4.2),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            result.negative_change(),
            result.negative_probability() - 0.08,
            epsilon = 1e-15
        );
        assert!(result.positive_change() > 0.0);
    }
}
