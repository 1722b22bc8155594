//! Case definitions authored by instructors.
//!
//! These shapes double as the persisted snapshot format and the wire
//! format of the HTTP API, so everything serializes camelCase.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// History-taking domain a criterion belongs to.
/// Wire strings keep the spaced form the authoring data uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionCategory {
    #[serde(rename = "Present Illness")]
    PresentIllness,
    #[serde(rename = "Past History")]
    PastHistory,
    #[serde(rename = "Family History")]
    FamilyHistory,
    #[serde(rename = "Social History")]
    SocialHistory,
}

impl std::fmt::Display for CriterionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriterionCategory::PresentIllness => write!(f, "Present Illness"),
            CriterionCategory::PastHistory => write!(f, "Past History"),
            CriterionCategory::FamilyHistory => write!(f, "Family History"),
            CriterionCategory::SocialHistory => write!(f, "Social History"),
        }
    }
}

// =============================================================================
// Patient Profile
// =============================================================================

/// Who the simulated patient is. Immutable once a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub chief_complaint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub detailed_background: String,
    pub personality: String,
}

impl PatientProfile {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            age: 0,
            gender: Gender::Male,
            chief_complaint: String::new(),
            avatar_url: None,
            detailed_background: String::new(),
            personality: String::new(),
        }
    }

    /// One-line description used for portrait generation.
    pub fn portrait_description(&self) -> String {
        format!(
            "{}, {} years old, {}. {}",
            self.name, self.age, self.gender, self.chief_complaint
        )
    }
}

// =============================================================================
// Criteria
// =============================================================================

/// One history-taking point the student is expected to cover.
///
/// `keywords` are hint metadata forwarded to the oracle prompt; nothing
/// in this codebase matches them locally (see ARCHITECTURE.md §2.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCriterion {
    /// Unique within the case and stable across edits.
    pub id: String,
    pub category: CriterionCategory,
    pub label: String,
    pub keywords: Vec<String>,
    pub expected_response: String,
}

impl CaseCriterion {
    /// Fresh empty criterion with a generated id, as the editor inserts.
    pub fn blank() -> Self {
        Self {
            id: format!("crit-{}", uuid::Uuid::new_v4()),
            category: CriterionCategory::PresentIllness,
            label: String::new(),
            keywords: Vec::new(),
            expected_response: String::new(),
        }
    }
}

// =============================================================================
// Patient Case
// =============================================================================

/// Complete authored simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCase {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub profile: PatientProfile,
    /// Ordered; the scorecard preserves this order.
    pub criteria: Vec<CaseCriterion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_rationale: Option<String>,
}

impl PatientCase {
    /// Fresh empty draft case with a generated id.
    pub fn blank() -> Self {
        Self {
            id: format!("case-{}", uuid::Uuid::new_v4()),
            title: String::new(),
            difficulty: Difficulty::Beginner,
            profile: PatientProfile::blank(),
            criteria: Vec::new(),
            expected_diagnosis: None,
            diagnosis_rationale: None,
        }
    }

    /// Authoring-save validation. Collects the wire names of every
    /// failed field so the caller can report all of them at once.
    pub fn validate(&self) -> Result<()> {
        let mut failed = Vec::new();
        if self.title.trim().is_empty() {
            failed.push("title".to_string());
        }
        if self.profile.name.trim().is_empty() {
            failed.push("profile.name".to_string());
        }
        if self.criteria.is_empty() {
            failed.push("criteria".to_string());
        }
        match &self.expected_diagnosis {
            Some(d) if !d.trim().is_empty() => {}
            _ => failed.push("expectedDiagnosis".to_string()),
        }
        let mut seen = std::collections::HashSet::new();
        if self.criteria.iter().any(|c| !seen.insert(c.id.as_str())) {
            failed.push("criteria.id".to_string());
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidCase(failed))
        }
    }

    pub fn criterion(&self, id: &str) -> Option<&CaseCriterion> {
        self.criteria.iter().find(|c| c.id == id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_case() -> PatientCase {
        let mut case = PatientCase::blank();
        case.title = "Chest Pain".to_string();
        case.profile.name = "นายสมชาย".to_string();
        case.profile.age = 55;
        case.criteria.push(CaseCriterion::blank());
        case.expected_diagnosis = Some("AMI".to_string());
        case
    }

    #[test]
    fn test_valid_case_passes_validation() {
        assert!(valid_case().validate().is_ok());
    }

    #[test]
    fn test_blank_case_reports_every_missing_field() {
        let err = PatientCase::blank().validate().unwrap_err();
        let CoreError::InvalidCase(fields) = err;
        assert_eq!(
            fields,
            vec!["title", "profile.name", "criteria", "expectedDiagnosis"]
        );
    }

    #[test]
    fn test_whitespace_only_diagnosis_is_rejected() {
        let mut case = valid_case();
        case.expected_diagnosis = Some("   ".to_string());
        let CoreError::InvalidCase(fields) = case.validate().unwrap_err();
        assert_eq!(fields, vec!["expectedDiagnosis"]);
    }

    #[test]
    fn test_duplicate_criterion_ids_are_rejected() {
        let mut case = valid_case();
        let mut dup = case.criteria[0].clone();
        dup.label = "other".to_string();
        case.criteria.push(dup);
        let CoreError::InvalidCase(fields) = case.validate().unwrap_err();
        assert_eq!(fields, vec!["criteria.id"]);
    }

    #[test]
    fn test_category_wire_strings_keep_spaces() {
        let json = serde_json::to_string(&CriterionCategory::PresentIllness).unwrap();
        assert_eq!(json, "\"Present Illness\"");
        let back: CriterionCategory = serde_json::from_str("\"Social History\"").unwrap();
        assert_eq!(back, CriterionCategory::SocialHistory);
    }

    #[test]
    fn test_case_serializes_camel_case() {
        let case = valid_case();
        let value = serde_json::to_value(&case).unwrap();
        assert!(value["profile"]["chiefComplaint"].is_string());
        assert!(value["expectedDiagnosis"].is_string());
        // No avatar was set, so the key is absent rather than null.
        assert!(value["profile"].get("avatarUrl").is_none());
    }

    #[test]
    fn test_blank_criterion_gets_unique_crit_id() {
        let a = CaseCriterion::blank();
        let b = CaseCriterion::blank();
        assert!(a.id.starts_with("crit-"));
        assert_ne!(a.id, b.id);
    }
}
