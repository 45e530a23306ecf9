// ========================================================================================
//
//                          The Guided Workflow Controller
//
// ========================================================================================
//
// Three steps, always in this order:
//
//   AgeEntry  ->  ProbabilityAdjustment  ->  TestSelection (terminal until reset)
//
// The controller exclusively owns the session. Every mutation goes through one of the
// transitions below, and every transition that touches an input rebuilds the
// `CalculationResult` from scratch.
//
// ### Invalidation Contract ###
//
// There is no step-back transition. A result is discarded only by `reset_session`,
// and the clinical probability is locked once a result exists, so a result can never
// describe inputs that are no longer in the session.

use crate::calculation::CalculationResult;
use crate::catalog::{self, TestId};
use crate::overrides::{LikelihoodOverrides, OverrideState};
use crate::prevalence;
use crate::types::{InputError, LrKind, validate_probability_percent};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    AgeEntry,
    ProbabilityAdjustment,
    TestSelection,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 3] = [
        WorkflowStep::AgeEntry,
        WorkflowStep::ProbabilityAdjustment,
        WorkflowStep::TestSelection,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            WorkflowStep::AgeEntry => 0,
            WorkflowStep::ProbabilityAdjustment => 1,
            WorkflowStep::TestSelection => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WorkflowStep::AgeEntry => "Input age",
            WorkflowStep::ProbabilityAdjustment => "Adjust risk",
            WorkflowStep::TestSelection => "Choose test",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.index() + 1, self.title())
    }
}

/// Progress marker for one step relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Current,
    Upcoming,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("'{operation}' is not available during {step}.")]
    OutOfStep {
        operation: &'static str,
        step: WorkflowStep,
    },
    #[error(
        "The clinical probability is locked once a result has been calculated. Start again to change it."
    )]
    ProbabilityLocked,
    #[error("No calculation has been run yet. Choose a test first.")]
    NoCalculation,
}

/// Everything one user interaction owns. Dropped wholesale on reset.
#[derive(Debug, Clone, Default)]
struct Session {
    age: Option<u32>,
    baseline_prevalence_percent: Option<f64>,
    clinical_probability_percent: f64,
    selected: Option<TestId>,
    overrides: Option<LikelihoodOverrides>,
    result: Option<CalculationResult>,
}

#[derive(Debug, Clone)]
pub struct WorkflowController {
    step: WorkflowStep,
    session: Session,
}

impl Default for WorkflowController {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowController {
    pub fn new() -> Self {
        Self {
            step: WorkflowStep::AgeEntry,
            session: Session::default(),
        }
    }

    // --- Read-only views ---

    #[inline]
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    #[inline]
    pub fn age(&self) -> Option<u32> {
        self.session.age
    }

    #[inline]
    pub fn baseline_prevalence_percent(&self) -> Option<f64> {
        self.session.baseline_prevalence_percent
    }

    #[inline]
    pub fn clinical_probability_percent(&self) -> f64 {
        self.session.clinical_probability_percent
    }

    #[inline]
    pub fn selected_test(&self) -> Option<TestId> {
        self.session.selected
    }

    #[inline]
    pub fn result(&self) -> Option<&CalculationResult> {
        self.session.result.as_ref()
    }

    #[inline]
    pub fn override_state(&self) -> Option<&OverrideState> {
        self.session.overrides.as_ref().and_then(|o| o.state())
    }

    pub fn step_progress(&self) -> [(WorkflowStep, StepStatus); 3] {
        let current = self.step.index();
        WorkflowStep::ALL.map(|step| {
            let status = match step.index() {
                i if i < current => StepStatus::Complete,
                i if i == current => StepStatus::Current,
                _ => StepStatus::Upcoming,
            };
            (step, status)
        })
    }

    // --- Transitions ---

    /// Step 1 -> 2. Seeds the clinical probability with the age band's prevalence.
    pub fn submit_age(&mut self, age: u32) -> Result<f64, WorkflowError> {
        self.require_step("submit age", WorkflowStep::AgeEntry)?;

        let baseline = prevalence::baseline_prevalence(age);
        self.session.age = Some(age);
        self.session.baseline_prevalence_percent = Some(baseline);
        self.session.clinical_probability_percent = baseline;
        self.step = WorkflowStep::ProbabilityAdjustment;

        log::info!("Age {age} accepted; baseline prevalence {baseline}%");
        Ok(baseline)
    }

    /// Parses raw age text, then behaves like [`submit_age`](Self::submit_age).
    pub fn submit_age_text(&mut self, raw: &str) -> Result<f64, WorkflowError> {
        self.require_step("submit age", WorkflowStep::AgeEntry)?;
        let age = prevalence::parse_age(raw).inspect_err(|err| {
            log::warn!("Rejected age input: {err}");
        })?;
        self.submit_age(age)
    }

    /// Sets the clinical probability (0-100). Allowed until a result has been produced.
    pub fn adjust_probability(&mut self, percent: f64) -> Result<(), WorkflowError> {
        if self.step == WorkflowStep::AgeEntry {
            return Err(WorkflowError::OutOfStep {
                operation: "adjust probability",
                step: self.step,
            });
        }
        if self.session.result.is_some() {
            return Err(WorkflowError::ProbabilityLocked);
        }
        let percent = validate_probability_percent(percent)?;
        self.session.clinical_probability_percent = percent;
        log::debug!("Clinical probability set to {percent}%");
        Ok(())
    }

    /// Step 2 -> 3. Advancing from step 3 is a no-op.
    pub fn advance(&mut self) -> Result<WorkflowStep, WorkflowError> {
        match self.step {
            WorkflowStep::AgeEntry => Err(WorkflowError::OutOfStep {
                operation: "advance",
                step: self.step,
            }),
            WorkflowStep::ProbabilityAdjustment => {
                validate_probability_percent(self.session.clinical_probability_percent)?;
                self.step = WorkflowStep::TestSelection;
                log::info!(
                    "Advancing to test selection with clinical probability {}%",
                    self.session.clinical_probability_percent
                );
                Ok(self.step)
            }
            WorkflowStep::TestSelection => Ok(self.step),
        }
    }

    /// Chooses a test and computes the result in one action.
    ///
    /// An unknown name is not an error: it returns `Ok(None)` and leaves the session
    /// exactly as it was. Choosing a different test than the current one discards any
    /// likelihood-ratio override; choosing the same test again keeps the ratios in force.
    pub fn calculate(
        &mut self,
        test_name: &str,
    ) -> Result<Option<&CalculationResult>, WorkflowError> {
        self.require_step("calculate", WorkflowStep::TestSelection)?;

        let Some(test) = catalog::find_by_name(test_name) else {
            log::warn!("Unknown test '{}'; nothing calculated", test_name.trim());
            return Ok(None);
        };

        let keep_overrides =
            self.session.selected == Some(test.id) && self.session.overrides.is_some();
        if !keep_overrides {
            self.session.overrides = Some(LikelihoodOverrides::new(test.likelihood_ratios));
        }
        self.session.selected = Some(test.id);
        log::info!("Calculating with {}", test.name);

        self.recompute().map(Some)
    }

    /// Replaces one likelihood ratio from raw text and recomputes. Rejected text changes nothing.
    pub fn edit_likelihood_ratio(
        &mut self,
        kind: LrKind,
        raw: &str,
    ) -> Result<&CalculationResult, WorkflowError> {
        if self.session.result.is_none() {
            return Err(WorkflowError::NoCalculation);
        }
        let overrides = self
            .session
            .overrides
            .as_mut()
            .ok_or(WorkflowError::NoCalculation)?;
        overrides.edit(kind, raw)?;
        self.recompute()
    }

    /// Restores the published ratios. While nothing is overridden this only returns the
    /// current result.
    pub fn reset_likelihood_ratios(&mut self) -> Result<&CalculationResult, WorkflowError> {
        if self.session.result.is_none() {
            return Err(WorkflowError::NoCalculation);
        }
        let overrides = self
            .session
            .overrides
            .as_mut()
            .ok_or(WorkflowError::NoCalculation)?;
        if overrides.reset().is_none() {
            log::debug!("Likelihood ratios already published; reset ignored");
        }
        self.recompute()
    }

    /// Back to step 1 from anywhere, clearing every input, the override, and the result.
    pub fn reset_session(&mut self) {
        self.session = Session::default();
        self.step = WorkflowStep::AgeEntry;
        log::info!("Session reset");
    }

    // --- Internals ---

    fn require_step(
        &self,
        operation: &'static str,
        step: WorkflowStep,
    ) -> Result<(), WorkflowError> {
        if self.step != step {
            return Err(WorkflowError::OutOfStep {
                operation,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Rebuilds the result from the inputs currently in the session.
    fn recompute(&mut self) -> Result<&CalculationResult, WorkflowError> {
        let session = &mut self.session;
        let (Some(baseline), Some(test), Some(overrides)) = (
            session.baseline_prevalence_percent,
            session.selected,
            session.overrides.as_ref(),
        ) else {
            return Err(WorkflowError::NoCalculation);
        };

        let result = CalculationResult::compute(
            baseline,
            session.clinical_probability_percent / 100.0,
            test,
            overrides.in_force(),
            overrides.is_overridden(),
        );
        let stored: &CalculationResult = session.result.insert(result);
        Ok(stored)
    }
}

/// Drives a fresh controller through all three steps and returns the result.
/// `Ok(None)` means the test name did not resolve.
pub fn run_calculation(
    age: u32,
    clinical_probability_percent: f64,
    test_name: &str,
) -> Result<Option<CalculationResult>, WorkflowError> {
    let mut controller = WorkflowController::new();
    controller.submit_age(age)?;
    controller.adjust_probability(clinical_probability_percent)?;
    controller.advance()?;
    Ok(controller.calculate(test_name)?.copied())
}
