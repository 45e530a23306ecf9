use crate::types::InputError;

/// A half-open age interval `[lower, upper)` with its population prevalence (0-100 scale).
/// `upper == None` marks the final, unbounded band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    pub lower: u32,
    pub upper: Option<u32>,
    pub prevalence_percent: f64,
}

impl AgeBand {
    #[inline]
    pub fn contains(&self, age: u32) -> bool {
        age >= self.lower && self.upper.is_none_or(|upper| age < upper)
    }

    /// Human-readable label for the reference table, e.g. `65-69` or `90+`.
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) if self.lower == 0 => format!("Under {upper}"),
            Some(upper) => format!("{}-{}", self.lower, upper - 1),
            None => format!("{}+", self.lower),
        }
    }
}

/// Citation for the prevalence figures in [`AGE_BANDS`].
pub const AGE_BANDS_SOURCE: &str = "Stevenson-Hoare J, Schalkamp A-K, Sandor C, Hardy J, \
Escott-Price V. New cases of dementia are rising in elderly populations in Wales, UK. \
Journal of the Neurological Sciences. 2023;451:120715.";
pub const AGE_BANDS_SOURCE_URL: &str = "https://doi.org/10.1016/j.jns.2023.120715";

/// Age-stratified background prevalence. Contiguous, ordered, and covering `[0, inf)`.
pub const AGE_BANDS: [AgeBand; 7] = [
    AgeBand {
        lower: 0,
        upper: Some(65),
        prevalence_percent: 0.9,
    },
    AgeBand {
        lower: 65,
        upper: Some(70),
        prevalence_percent: 1.7,
    },
    AgeBand {
        lower: 70,
        upper: Some(75),
        prevalence_percent: 3.3,
    },
    AgeBand {
        lower: 75,
        upper: Some(80),
        prevalence_percent: 8.0,
    },
    AgeBand {
        lower: 80,
        upper: Some(85),
        prevalence_percent: 12.1,
    },
    AgeBand {
        lower: 85,
        upper: Some(90),
        prevalence_percent: 21.9,
    },
    AgeBand {
        lower: 90,
        upper: None,
        prevalence_percent: 40.8,
    },
];

/// Finds the band an age falls into. Total over `u32`.
pub fn band_for_age(age: u32) -> &'static AgeBand {
    // The last band is unbounded, so the fallback is only reached for ages inside it.
    AGE_BANDS
        .iter()
        .find(|band| band.contains(age))
        .unwrap_or(&AGE_BANDS[AGE_BANDS.len() - 1])
}

/// Baseline population prevalence for an age, as a percentage.
#[inline]
pub fn baseline_prevalence(age: u32) -> f64 {
    band_for_age(age).prevalence_percent
}

/// Parses raw age text into whole years, rejecting negatives explicitly.
pub fn parse_age(raw: &str) -> Result<u32, InputError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| InputError::InvalidAge(trimmed.to_string()))?;
    if value < 0 {
        return Err(InputError::NegativeAge(value));
    }
    u32::try_from(value).map_err(|_| InputError::InvalidAge(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_contiguous_and_unbounded_above() {
        assert_eq!(AGE_BANDS[0].lower, 0);
        for pair in AGE_BANDS.windows(2) {
            assert_eq!(pair[0].upper, Some(pair[1].lower));
        }
        assert_eq!(AGE_BANDS[AGE_BANDS.len() - 1].upper, None);
    }

    #[test]
    fn every_age_maps_to_exactly_one_band() {
        for age in 0..=130 {
            let hits = AGE_BANDS.iter().filter(|band| band.contains(age)).count();
            assert_eq!(hits, 1, "age {age} matched {hits} bands");
        }
        assert_eq!(
            AGE_BANDS.iter().filter(|band| band.contains(u32::MAX)).count(),
            1
        );
    }

    #[test]
    fn boundary_ages_fall_into_the_adjacent_band() {
        let cases = [
            (64, 0.9),
            (65, 1.7),
            (69, 1.7),
            (70, 3.3),
            (74, 3.3),
            (75, 8.0),
            (79, 8.0),
            (80, 12.1),
            (84, 12.1),
            (85, 21.9),
            (89, 21.9),
            (90, 40.8),
        ];
        for (age, expected) in cases {
            assert_eq!(baseline_prevalence(age), expected, "age {age}");
        }
    }

    #[test]
    fn extremes_are_covered() {
        assert_eq!(baseline_prevalence(0), 0.9);
        assert_eq!(baseline_prevalence(u32::MAX), 40.8);
    }

    #[test]
    fn labels_match_the_reference_table() {
        let labels: Vec<String> = AGE_BANDS.iter().map(AgeBand::label).collect();
        assert_eq!(
            labels,
            vec!["Under 65", "65-69", "70-74", "75-79", "80-84", "85-89", "90+"]
        );
    }

    #[test]
    fn parse_age_accepts_whole_years() {
        assert_eq!(parse_age("70"), Ok(70));
        assert_eq!(parse_age("  0 "), Ok(0));
    }

    #[test]
    fn parse_age_rejects_negative_and_malformed_text() {
        assert_eq!(parse_age("-3"), Err(InputError::NegativeAge(-3)));
        assert_eq!(
            parse_age("seventy"),
            Err(InputError::InvalidAge("seventy".to_string()))
        );
        assert_eq!(parse_age("70.5"), Err(InputError::InvalidAge("70.5".to_string())));
        assert_eq!(parse_age(""), Err(InputError::InvalidAge(String::new())));
        assert!(matches!(parse_age("99999999999"), Err(InputError::InvalidAge(_))));
    }
}
