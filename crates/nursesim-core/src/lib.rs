//! nursesim-core: shared domain model for the nursing simulation.
//! Case and criteria types, transcript records, evaluation verdicts,
//! and the scorecard derivation described in ARCHITECTURE.md §2.

pub mod case;
pub mod error;
pub mod evaluation;
pub mod scorecard;
pub mod transcript;

pub use case::{CaseCriterion, CriterionCategory, Difficulty, Gender, PatientCase, PatientProfile};
pub use error::{CoreError, Result};
pub use evaluation::{DiagnosisSubmission, EvaluationResult};
pub use scorecard::{Scorecard, ScorecardRow};
pub use transcript::{ChatMessage, Role};
