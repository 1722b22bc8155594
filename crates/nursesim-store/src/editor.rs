//! Case authoring editor.
//!
//! Wraps a case under construction. Edits stay local until `save`
//! validates and hands the case to the repository.
//! See ARCHITECTURE.md §4.3

use nursesim_core::{CaseCriterion, CoreError, CriterionCategory, PatientCase};
use thiserror::Error;

use crate::blob::StoreError;
use crate::repository::CaseRepository;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Field-wise update for one criterion; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct CriterionPatch {
    pub category: Option<CriterionCategory>,
    pub label: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub expected_response: Option<String>,
}

/// Case under construction.
#[derive(Debug, Clone)]
pub struct CaseDraft {
    case: PatientCase,
}

impl CaseDraft {
    /// Fresh draft with a generated case id.
    pub fn blank() -> Self {
        Self {
            case: PatientCase::blank(),
        }
    }

    /// Edit an existing case. The repository copy stays untouched
    /// until the draft is saved.
    pub fn edit(case: PatientCase) -> Self {
        Self { case }
    }

    pub fn case(&self) -> &PatientCase {
        &self.case
    }

    pub fn case_mut(&mut self) -> &mut PatientCase {
        &mut self.case
    }

    /// Append a fresh empty criterion and return its generated id.
    pub fn add_criterion(&mut self) -> String {
        let crit = CaseCriterion::blank();
        let id = crit.id.clone();
        self.case.criteria.push(crit);
        id
    }

    /// Merge patch fields into the matching criterion. An unknown id
    /// is a silent no-op.
    pub fn update_criterion(&mut self, id: &str, patch: CriterionPatch) {
        if let Some(c) = self.case.criteria.iter_mut().find(|c| c.id == id) {
            if let Some(category) = patch.category {
                c.category = category;
            }
            if let Some(label) = patch.label {
                c.label = label;
            }
            if let Some(keywords) = patch.keywords {
                c.keywords = keywords;
            }
            if let Some(expected) = patch.expected_response {
                c.expected_response = expected;
            }
        }
    }

    pub fn remove_criterion(&mut self, id: &str) {
        self.case.criteria.retain(|c| c.id != id);
    }

    /// Validate, then upsert into the repository. A rejected draft is
    /// left intact for correction and the repository is untouched.
    pub async fn save(&self, repo: &CaseRepository) -> Result<PatientCase, SaveError> {
        self.case.validate()?;
        repo.upsert(self.case.clone()).await?;
        Ok(self.case.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryStore;
    use std::sync::Arc;

    fn filled_draft() -> CaseDraft {
        let mut draft = CaseDraft::blank();
        draft.case_mut().title = "Burn Assessment".to_string();
        draft.case_mut().profile.name = "นางสาวเอ".to_string();
        draft.case_mut().expected_diagnosis = Some("Partial thickness burn".to_string());
        let id = draft.add_criterion();
        draft.update_criterion(
            &id,
            CriterionPatch {
                label: Some("ระยะเวลาที่โดนความร้อน".to_string()),
                ..Default::default()
            },
        );
        draft
    }

    #[test]
    fn test_add_criterion_returns_its_id() {
        let mut draft = CaseDraft::blank();
        let id = draft.add_criterion();
        assert_eq!(draft.case().criteria.len(), 1);
        assert_eq!(draft.case().criteria[0].id, id);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut draft = CaseDraft::blank();
        let id = draft.add_criterion();
        draft.update_criterion(
            &id,
            CriterionPatch {
                category: Some(CriterionCategory::FamilyHistory),
                keywords: Some(vec!["พ่อแม่".to_string()]),
                ..Default::default()
            },
        );
        let crit = &draft.case().criteria[0];
        assert_eq!(crit.category, CriterionCategory::FamilyHistory);
        assert_eq!(crit.keywords, vec!["พ่อแม่"]);
        assert!(crit.label.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op() {
        let mut draft = CaseDraft::blank();
        draft.add_criterion();
        let before = draft.case().clone();
        draft.update_criterion(
            "crit-unknown",
            CriterionPatch {
                label: Some("should not land".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(draft.case().criteria[0].label, before.criteria[0].label);
        assert_eq!(draft.case().criteria.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejection_leaves_repository_unchanged() {
        let repo = CaseRepository::open(Arc::new(MemoryStore::new())).unwrap();
        let count_before = repo.len().await;

        let draft = CaseDraft::blank();
        let err = draft.save(&repo).await.unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));
        assert_eq!(repo.len().await, count_before);
        // The draft itself is still editable after the rejection.
        assert!(draft.case().title.is_empty());
    }

    #[tokio::test]
    async fn test_save_valid_draft_upserts() {
        let repo = CaseRepository::open(Arc::new(MemoryStore::new())).unwrap();
        let draft = filled_draft();
        let saved = draft.save(&repo).await.unwrap();
        assert!(repo.get(&saved.id).await.is_some());
    }

    #[tokio::test]
    async fn test_editing_existing_case_keeps_its_id() {
        let repo = CaseRepository::open(Arc::new(MemoryStore::new())).unwrap();
        let original = repo.get("case-001").await.unwrap();

        let mut draft = CaseDraft::edit(original.clone());
        draft.case_mut().title = "Chest Pain (revised)".to_string();
        draft.save(&repo).await.unwrap();

        assert_eq!(repo.len().await, 2);
        assert_eq!(repo.get("case-001").await.unwrap().title, "Chest Pain (revised)");
    }
}
