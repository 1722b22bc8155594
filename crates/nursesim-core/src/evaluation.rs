//! Evaluation verdicts and the student's diagnosis submission.

use serde::{Deserialize, Serialize};

/// The student's free-text answer pair captured at the end of an
/// encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisSubmission {
    pub diagnosis: String,
    pub rationale: String,
}

/// Graded verdict returned by the oracle.
///
/// Every field is required on deserialization; a payload missing any of
/// them is malformed, never partially usable. `criteria_met` entries
/// are untrusted output: ids that do not belong to the case are ignored
/// by the scorecard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Overall history-taking score, 0 to 100.
    pub score: i64,
    /// Ids of the case criteria the oracle judged covered.
    pub criteria_met: Vec<String>,
    /// Diagnosis accuracy, 0 to 100.
    pub diagnosis_score: i64,
    pub diagnosis_feedback: String,
    pub feedback: String,
}

impl EvaluationResult {
    /// Both scores inside the 0..=100 range the grading schema declares.
    pub fn scores_in_range(&self) -> bool {
        (0..=100).contains(&self.score) && (0..=100).contains(&self.diagnosis_score)
    }
}
