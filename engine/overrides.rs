use crate::types::{
    InputError, LikelihoodRatios, LrKind, parse_likelihood_ratio, validate_likelihood_ratio,
};

/// Present only while at least one in-force ratio differs from the published pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideState {
    /// Published values captured at the first edit. Later edits never re-capture.
    pub original: LikelihoodRatios,
}

/// Tracks user substitutions of a test's likelihood ratios and how to undo them.
///
/// States:
/// * Published: `state == None`, in-force ratios equal the catalog's.
/// * Overridden: `state == Some(..)`, one or both ratios replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodOverrides {
    published: LikelihoodRatios,
    in_force: LikelihoodRatios,
    state: Option<OverrideState>,
}

impl LikelihoodOverrides {
    pub fn new(published: LikelihoodRatios) -> Self {
        Self {
            published,
            in_force: published,
            state: None,
        }
    }

    #[inline]
    pub fn in_force(&self) -> LikelihoodRatios {
        self.in_force
    }

    #[inline]
    pub fn published(&self) -> LikelihoodRatios {
        self.published
    }

    #[inline]
    pub fn is_overridden(&self) -> bool {
        self.state.is_some()
    }

    #[inline]
    pub fn state(&self) -> Option<&OverrideState> {
        self.state.as_ref()
    }

    /// Parses `raw` and replaces one ratio. Nothing changes if parsing fails.
    pub fn edit(&mut self, kind: LrKind, raw: &str) -> Result<LikelihoodRatios, InputError> {
        let value = parse_likelihood_ratio(raw).inspect_err(|err| {
            log::warn!("Rejected {kind} edit '{}': {err}", raw.trim());
        })?;
        self.set(kind, value)
    }

    /// Replaces one ratio with an already-numeric value, leaving the other as it is.
    pub fn set(&mut self, kind: LrKind, value: f64) -> Result<LikelihoodRatios, InputError> {
        let value = validate_likelihood_ratio(value)?;

        let original = match self.state {
            Some(state) => state.original,
            None => self.published,
        };
        self.in_force = self.in_force.with(kind, value);

        if self.in_force == original {
            log::debug!("{kind} edit restored the published values; override cleared");
            self.state = None;
        } else {
            if self.state.is_none() {
                log::info!(
                    "Overriding published ratios (LR+ {}, LR- {})",
                    original.positive,
                    original.negative
                );
            }
            self.state = Some(OverrideState { original });
        }
        Ok(self.in_force)
    }

    /// Restores the captured originals. Returns `None` and does nothing while Published.
    pub fn reset(&mut self) -> Option<LikelihoodRatios> {
        let state = self.state.take()?;
        self.in_force = state.original;
        log::info!(
            "Likelihood ratios reset to LR+ {}, LR- {}",
            state.original.positive,
            state.original.negative
        );
        Some(self.in_force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptau217() -> LikelihoodRatios {
        LikelihoodRatios {
            positive: 7.1,
            negative: 0.1,
        }
    }

    #[test]
    fn starts_published() {
        let overrides = LikelihoodOverrides::new(ptau217());
        assert!(!overrides.is_overridden());
        assert_eq!(overrides.in_force(), ptau217());
        assert!(overrides.state().is_none());
    }

    #[test]
    fn first_edit_captures_the_published_pair() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        let ratios = overrides.edit(LrKind::Positive, "10").unwrap();
        assert_eq!(ratios.positive, 10.0);
        assert_eq!(ratios.negative, 0.1);
        assert_eq!(overrides.state().map(|s| s.original), Some(ptau217()));
    }

    #[test]
    fn repeated_edits_keep_the_true_original() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        overrides.edit(LrKind::Positive, "10").unwrap();
        overrides.edit(LrKind::Positive, "12").unwrap();
        overrides.edit(LrKind::Negative, "0.3").unwrap();
        assert_eq!(
            overrides.in_force(),
            LikelihoodRatios {
                positive: 12.0,
                negative: 0.3
            }
        );
        assert_eq!(overrides.state().map(|s| s.original), Some(ptau217()));
    }

    #[test]
    fn editing_one_side_keeps_an_earlier_override_of_the_other() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        overrides.edit(LrKind::Negative, "0.05").unwrap();
        let ratios = overrides.edit(LrKind::Positive, "9").unwrap();
        assert_eq!(ratios.negative, 0.05);
        assert_eq!(ratios.positive, 9.0);
    }

    #[test]
    fn invalid_text_leaves_state_untouched() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        overrides.edit(LrKind::Positive, "10").unwrap();
        let before = overrides.clone();

        assert!(overrides.edit(LrKind::Negative, "abc").is_err());
        assert!(overrides.edit(LrKind::Negative, "-1").is_err());
        assert!(overrides.set(LrKind::Positive, f64::NAN).is_err());
        assert_eq!(overrides, before);
    }

    #[test]
    fn reset_restores_originals_and_returns_to_published() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        overrides.edit(LrKind::Positive, "10").unwrap();
        overrides.edit(LrKind::Negative, "0.4").unwrap();

        assert_eq!(overrides.reset(), Some(ptau217()));
        assert!(!overrides.is_overridden());
        assert_eq!(overrides.in_force(), ptau217());
    }

    #[test]
    fn reset_while_published_is_a_no_op() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        assert_eq!(overrides.reset(), None);
        assert_eq!(overrides.in_force(), ptau217());
    }

    #[test]
    fn editing_back_to_published_values_clears_the_override() {
        let mut overrides = LikelihoodOverrides::new(ptau217());
        overrides.edit(LrKind::Positive, "10").unwrap();
        overrides.edit(LrKind::Positive, "7.1").unwrap();
        assert!(!overrides.is_overridden());
        assert_eq!(overrides.reset(), None);
    }
}
