//! Per-criterion scorecard derived locally from an oracle verdict.
//! See ARCHITECTURE.md §2.3.

use serde::{Deserialize, Serialize};

use crate::case::{CriterionCategory, PatientCase};
use crate::evaluation::EvaluationResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardRow {
    pub criterion_id: String,
    pub label: String,
    pub category: CriterionCategory,
    pub met: bool,
}

/// One row per case criterion, in case order. Pure derivation, no I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub rows: Vec<ScorecardRow>,
}

impl Scorecard {
    /// A criterion is met iff its id appears in the verdict's
    /// `criteriaMet`. Ids the oracle invents match nothing and are
    /// dropped; every case criterion appears exactly once.
    pub fn derive(case: &PatientCase, result: &EvaluationResult) -> Self {
        let rows = case
            .criteria
            .iter()
            .map(|c| ScorecardRow {
                criterion_id: c.id.clone(),
                label: c.label.clone(),
                category: c.category,
                met: result.criteria_met.iter().any(|id| id == &c.id),
            })
            .collect();
        Self { rows }
    }

    pub fn met_count(&self) -> usize {
        self.rows.iter().filter(|r| r.met).count()
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }
}
