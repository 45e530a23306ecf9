#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

//! Pre-test / post-test probability engine for neurodegenerative biomarker tests.
//!
//! Age gives a population prevalence, the clinician adjusts it into a pre-test
//! probability, and a biomarker test's likelihood ratios turn that into post-test
//! probabilities for a positive and a negative result.

pub mod bayes;
pub mod calculation;
pub mod catalog;
pub mod config;
pub mod overrides;
pub mod prevalence;
pub mod report;
pub mod types;
pub mod workflow;

pub use calculation::CalculationResult;
pub use catalog::{BiomarkerTest, TestId, find_by_name, list_tests};
pub use prevalence::baseline_prevalence;
pub use types::{InputError, LikelihoodRatios, LrKind};
pub use workflow::{WorkflowController, WorkflowError, WorkflowStep, run_calculation};
