//! Diagnosis submission form.
//!
//! Mirrors the end-of-session form the student fills in: free-text
//! diagnosis plus optional rationale, with edits locked while a
//! submission is in flight and permanently after acceptance.

use nursesim_core::DiagnosisSubmission;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("diagnosis text is required")]
    MissingDiagnosis,
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("submission was already accepted")]
    AlreadyAccepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Editing,
    Submitting,
    Accepted,
}

#[derive(Debug, Default)]
pub struct DiagnosisForm {
    diagnosis: String,
    rationale: String,
    state: FormState,
}

impl DiagnosisForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Edits apply only while the form is editable, like disabled
    /// inputs during submission.
    pub fn set_diagnosis(&mut self, text: impl Into<String>) {
        if self.state == FormState::Editing {
            self.diagnosis = text.into();
        }
    }

    pub fn set_rationale(&mut self, text: impl Into<String>) {
        if self.state == FormState::Editing {
            self.rationale = text.into();
        }
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Editing && !self.diagnosis.trim().is_empty()
    }

    /// Freeze the form and hand back the submission payload.
    pub fn begin_submit(&mut self) -> Result<DiagnosisSubmission, DiagnosisError> {
        match self.state {
            FormState::Submitting => return Err(DiagnosisError::SubmissionInFlight),
            FormState::Accepted => return Err(DiagnosisError::AlreadyAccepted),
            FormState::Editing => {}
        }
        if self.diagnosis.trim().is_empty() {
            return Err(DiagnosisError::MissingDiagnosis);
        }
        self.state = FormState::Submitting;
        Ok(DiagnosisSubmission {
            diagnosis: self.diagnosis.clone(),
            rationale: self.rationale.clone(),
        })
    }

    /// Settle an in-flight submission. On failure the text survives so
    /// the student can retry without retyping.
    pub fn settle(&mut self, success: bool) {
        if self.state == FormState::Submitting {
            self.state = if success {
                FormState::Accepted
            } else {
                FormState::Editing
            };
        }
    }
}
