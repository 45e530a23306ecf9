// ========================================================================================
//                              Biomarker Test Catalog
// ========================================================================================
//
// The catalog is compiled-in reference data. Tests are identified by a closed set of
// `TestId` variants; the published name is only used at the boundary where a user
// picks a test by string, and an unknown name resolves to `None`.

use crate::types::LikelihoodRatios;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestId {
    PlasmaPTau217,
    CsfAbeta4240Ratio,
}

impl TestId {
    /// Catalog order.
    pub const ALL: [TestId; 2] = [TestId::PlasmaPTau217, TestId::CsfAbeta4240Ratio];

    pub fn test(self) -> &'static BiomarkerTest {
        match self {
            TestId::PlasmaPTau217 => &CATALOG[0],
            TestId::CsfAbeta4240Ratio => &CATALOG[1],
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.test().name
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A published biomarker test and the evidence behind its likelihood ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomarkerTest {
    pub id: TestId,
    pub name: &'static str,
    /// Decision cutoff reported by the source. Informational only.
    pub threshold: f64,
    pub likelihood_ratios: LikelihoodRatios,
    pub source: &'static str,
    pub source_url: &'static str,
}

static CATALOG: [BiomarkerTest; 2] = [
    BiomarkerTest {
        id: TestId::PlasmaPTau217,
        name: "Plasma pTau217",
        threshold: 0.22,
        likelihood_ratios: LikelihoodRatios {
            positive: 7.1,
            negative: 0.1,
        },
        source: "Palmqvist S, et al. (2020) - JAMA",
        source_url: "https://jamanetwork.com/journals/jama/fullarticle/2768841",
    },
    BiomarkerTest {
        id: TestId::CsfAbeta4240Ratio,
        name: "CSF AB 42:40 ratio",
        threshold: 0.067,
        likelihood_ratios: LikelihoodRatios {
            positive: 4.2,
            negative: 0.2,
        },
        source: "Based on performance relative to amyloid PET positivity, Baldeiras I, et al. (2018) - Alzheimers Research & Therapy",
        source_url: "https://alzres.biomedcentral.com/articles/10.1186/s13195-018-0362-2",
    },
];

/// All tests in catalog order, for populating a selection control.
#[inline]
pub fn list_tests() -> &'static [BiomarkerTest] {
    &CATALOG
}

/// Resolves a published test name. Surrounding whitespace is ignored; the match is otherwise exact.
pub fn find_by_name(name: &str) -> Option<&'static BiomarkerTest> {
    let wanted = name.trim();
    CATALOG.iter().find(|test| test.name == wanted)
}
