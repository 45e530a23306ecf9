// ========================================================================================
//                           Result Interpretation & Rendering
// ========================================================================================

use crate::bayes::{self, UpdateTrace};
use crate::calculation::CalculationResult;
use crate::config::{CalculatorConfig, DecisionThresholds, DisplayConfig};
use crate::prevalence::{AGE_BANDS, AGE_BANDS_SOURCE, AGE_BANDS_SOURCE_URL};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const CONDITION: &str = "Alzheimer's disease";

/// Closing note printed under every text report.
pub const DISCLAIMER: &str = "This tool is for educational purposes only and is not approved \
for clinical use. The calculations are based on published likelihood ratios and may not reflect \
individual patient circumstances.";

/// What one branch of a result means against the configured cut-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Confirms,
    RulesOut,
    Inconclusive,
}

pub fn positive_verdict(result: &CalculationResult, thresholds: &DecisionThresholds) -> Verdict {
    if result.positive_probability() >= thresholds.rule_in {
        Verdict::Confirms
    } else {
        Verdict::Inconclusive
    }
}

pub fn negative_verdict(result: &CalculationResult, thresholds: &DecisionThresholds) -> Verdict {
    if result.negative_probability() <= thresholds.rule_out {
        Verdict::RulesOut
    } else {
        Verdict::Inconclusive
    }
}

/// The serialisable form of a result, with its interpretation and citation attached.
///
/// `Display` renders the plain-text report: headline probabilities, verdicts, ratios,
/// and the odds walk-through for the positive branch.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub test: &'static str,
    pub source: &'static str,
    pub source_url: &'static str,
    pub disclaimer: &'static str,
    pub positive_verdict: Verdict,
    pub negative_verdict: Verdict,
    pub thresholds: DecisionThresholds,
    pub result: &'a CalculationResult,
    pub positive_trace: UpdateTrace,
    pub negative_trace: UpdateTrace,
    #[serde(skip)]
    display: DisplayConfig,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a CalculationResult, config: &CalculatorConfig) -> Self {
        let test = result.test.test();
        Self {
            test: test.name,
            source: test.source,
            source_url: test.source_url,
            disclaimer: DISCLAIMER,
            positive_verdict: positive_verdict(result, &config.thresholds),
            negative_verdict: negative_verdict(result, &config.thresholds),
            thresholds: config.thresholds,
            result,
            positive_trace: bayes::trace_update(
                result.clinical_probability,
                result.likelihood_ratios.positive,
            ),
            negative_trace: bayes::trace_update(
                result.clinical_probability,
                result.likelihood_ratios.negative,
            ),
            display: config.display,
        }
    }

    pub fn walkthrough(&self) -> OddsWalkthrough<'_> {
        OddsWalkthrough {
            trace: &self.positive_trace,
            display: self.display,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let pd = self.display.probability_decimals;
        let rd = self.display.ratio_decimals;

        writeln!(f, "Test: {}", self.test)?;
        writeln!(
            f,
            "Population risk for age group: {:.1}%",
            result.baseline_prevalence_percent
        )?;
        writeln!(
            f,
            "Clinical (pre-test) probability: {}",
            percent(result.clinical_probability, pd)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "If the test is positive: {} ({} {})",
            percent(result.positive_probability(), pd),
            direction(result.positive_change()),
            percent(result.positive_change().abs(), pd)
        )?;
        writeln!(
            f,
            "  This result is {} to confidently confirm {CONDITION} (using threshold of {}).",
            sufficiency(self.positive_verdict == Verdict::Confirms),
            percent(self.thresholds.rule_in, pd)
        )?;
        writeln!(
            f,
            "If the test is negative: {} ({} {})",
            percent(result.negative_probability(), pd),
            direction(result.negative_change()),
            percent(result.negative_change().abs(), pd)
        )?;
        writeln!(
            f,
            "  This result is {} to confidently rule out {CONDITION} (using threshold of {}).",
            sufficiency(self.negative_verdict == Verdict::RulesOut),
            percent(self.thresholds.rule_out, pd)
        )?;
        writeln!(f)?;

        let edited = if result.likelihood_ratios_overridden {
            " (edited)"
        } else {
            ""
        };
        writeln!(f, "Likelihood ratios{edited}")?;
        writeln!(
            f,
            "  Positive test strength (LR+): {:.*}",
            rd, result.likelihood_ratios.positive
        )?;
        writeln!(
            f,
            "  Negative test strength (LR-): {:.*}",
            rd, result.likelihood_ratios.negative
        )?;
        writeln!(f, "  Source: {}", self.source)?;
        writeln!(f, "  {}", self.source_url)?;
        writeln!(f)?;

        writeln!(f, "{}", self.walkthrough())?;
        writeln!(f, "{}", self.disclaimer)
    }
}

/// The four-step odds walk-through for one branch.
#[derive(Debug, Clone, Copy)]
pub struct OddsWalkthrough<'a> {
    pub trace: &'a UpdateTrace,
    pub display: DisplayConfig,
}

impl fmt::Display for OddsWalkthrough<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trace = self.trace;
        let pd = self.display.probability_decimals;
        let rd = self.display.ratio_decimals;
        let pre = percent(trace.pre_test_probability, pd);

        writeln!(f, "How this was calculated")?;
        writeln!(f, "  1. Start with the pre-test probability: {pre}")?;
        writeln!(
            f,
            "  2. Convert to odds: {pre} / (1 - {pre}) = {:.4}",
            trace.pre_test_odds
        )?;
        writeln!(
            f,
            "  3. Multiply by the test likelihood ratio: {:.4} x {:.*} = {:.4}",
            trace.pre_test_odds, rd, trace.likelihood_ratio, trace.post_test_odds
        )?;
        writeln!(
            f,
            "  4. Convert back to probability: odds / (1 + odds) = {}",
            percent(trace.post_test_probability, pd)
        )
    }
}

/// Population risk by age, one row per band.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandTable;

impl fmt::Display for BandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Population risk by age")?;
        writeln!(f, "  {:<12} {:>10}", "Age group", "Risk")?;
        for band in &AGE_BANDS {
            writeln!(
                f,
                "  {:<12} {:>9.1}%",
                band.label(),
                band.prevalence_percent
            )?;
        }
        writeln!(f, "  Source: {AGE_BANDS_SOURCE}")?;
        writeln!(f, "  {AGE_BANDS_SOURCE_URL}")
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

#[inline]
pub fn render_text(result: &CalculationResult, config: &CalculatorConfig) -> String {
    Report::new(result, config).to_string()
}

pub fn render_toml(
    result: &CalculationResult,
    config: &CalculatorConfig,
) -> Result<String, ReportError> {
    Ok(toml::to_string_pretty(&Report::new(result, config))?)
}

#[inline]
fn percent(probability: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, probability * 100.0)
}

fn direction(change: f64) -> &'static str {
    if change >= 0.0 { "up" } else { "down" }
}

fn sufficiency(met: bool) -> &'static str {
    if met { "sufficient" } else { "not sufficient" }
}
