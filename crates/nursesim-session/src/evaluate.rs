//! Grading pass over a finished interview.
//!
//! Sends the transcript and the student's diagnosis to the oracle with
//! a schema-constrained request, then parses and range-checks the
//! verdict. Transport failures are retryable; a verdict that does not
//! match the schema is not.

use std::time::Instant;

use nursesim_core::{ChatMessage, DiagnosisSubmission, EvaluationResult, PatientCase};
use nursesim_llm::audit::OracleAuditEntry;
use nursesim_llm::backend::{GenerativeBackend, OracleError};
use thiserror::Error;

use crate::prompt;

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Transport or API failure. The submission may be retried.
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),
    /// The oracle answered, but not with a usable verdict.
    #[error("malformed verdict: {0}")]
    Malformed(String),
}

/// Grade a finished session. The transcript is the full interview
/// including the greeting; the oracle sees it verbatim.
pub async fn evaluate(
    backend: &dyn GenerativeBackend,
    case: &PatientCase,
    transcript: &[ChatMessage],
    submission: &DiagnosisSubmission,
    session_id: Option<&str>,
) -> Result<EvaluationResult, EvaluationError> {
    let request =
        prompt::evaluation_request(case, transcript, submission).map_err(OracleError::from)?;

    let started = Instant::now();
    let resp = backend.generate(request).await?;
    OracleAuditEntry::new(
        session_id.map(str::to_string),
        resp.model.clone(),
        "generate".to_string(),
        resp.prompt_tokens,
        resp.completion_tokens,
        &resp.text,
        started.elapsed().as_millis() as u64,
    )
    .record();

    parse_verdict(&resp.text)
}

/// Parse the oracle's verdict text. Schema-constrained output is still
/// model output, so both shape and score ranges are enforced here.
pub fn parse_verdict(text: &str) -> Result<EvaluationResult, EvaluationError> {
    let result: EvaluationResult = serde_json::from_str(text.trim())
        .map_err(|e| EvaluationError::Malformed(e.to_string()))?;
    if !result.scores_in_range() {
        return Err(EvaluationError::Malformed(format!(
            "scores out of range: score={}, diagnosisScore={}",
            result.score, result.diagnosis_score
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nursesim_llm::backend::{Avatar, GenRequest, GenResponse, SpeechClip};
    use std::sync::Mutex;

    struct VerdictBackend {
        verdict: &'static str,
        fail: bool,
        seen: Mutex<Option<GenRequest>>,
    }

    impl VerdictBackend {
        fn answering(verdict: &'static str) -> Self {
            Self {
                verdict,
                fail: false,
                seen: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                verdict: "",
                fail: true,
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for VerdictBackend {
        async fn generate(&self, req: GenRequest) -> Result<GenResponse, OracleError> {
            *self.seen.lock().unwrap() = Some(req);
            if self.fail {
                return Err(OracleError::Unavailable("scripted outage".to_string()));
            }
            Ok(GenResponse {
                text: self.verdict.to_string(),
                model: "scripted".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            })
        }

        async fn speak(&self, _text: &str, _voice: Option<&str>) -> Result<SpeechClip, OracleError> {
            Ok(SpeechClip {
                audio: Vec::new(),
                mime_type: "audio/pcm;rate=24000".to_string(),
                voice: "Kore".to_string(),
                model: "scripted".to_string(),
            })
        }

        async fn portrait(&self, _description: &str) -> Result<Avatar, OracleError> {
            Ok(Avatar::Placeholder {
                url: "https://example.invalid/a.png".to_string(),
            })
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn fixture() -> (PatientCase, Vec<ChatMessage>, DiagnosisSubmission) {
        let mut case = PatientCase::blank();
        case.title = "Chest Pain".to_string();
        case.profile.name = "นายสมชาย".to_string();
        case.expected_diagnosis = Some("Acute MI".to_string());
        let transcript = vec![
            ChatMessage::model("สวัสดีครับ"),
            ChatMessage::user("เจ็บตรงไหนคะ"),
            ChatMessage::model("เจ็บหน้าอกครับ"),
        ];
        let submission = DiagnosisSubmission {
            diagnosis: "Acute MI".to_string(),
            rationale: "classic presentation".to_string(),
        };
        (case, transcript, submission)
    }

    const GOOD_VERDICT: &str = r#"{
        "score": 85,
        "criteriaMet": ["crit-1"],
        "diagnosisScore": 90,
        "diagnosisFeedback": "วินิจฉัยถูกต้อง",
        "feedback": "ซักประวัติได้ครอบคลุม"
    }"#;

    #[tokio::test]
    async fn test_evaluate_parses_schema_verdict() {
        let (case, transcript, submission) = fixture();
        let backend = VerdictBackend::answering(GOOD_VERDICT);
        let result = evaluate(&backend, &case, &transcript, &submission, Some("s-1"))
            .await
            .unwrap();
        assert_eq!(result.score, 85);
        assert_eq!(result.criteria_met, vec!["crit-1".to_string()]);
        assert_eq!(result.diagnosis_score, 90);
    }

    #[tokio::test]
    async fn test_evaluate_sends_schema_constrained_request() {
        let (case, transcript, submission) = fixture();
        let backend = VerdictBackend::answering(GOOD_VERDICT);
        evaluate(&backend, &case, &transcript, &submission, None)
            .await
            .unwrap();

        let seen = backend.seen.lock().unwrap();
        let req = seen.as_ref().unwrap();
        assert!(req.response_schema.is_some());
        assert_eq!(req.turns.len(), 1);
        assert!(req.turns[0].text.contains("Acute MI"));
        assert!(req.turns[0].text.contains("เจ็บหน้าอกครับ"));
    }

    #[tokio::test]
    async fn test_oracle_outage_is_retryable() {
        let (case, transcript, submission) = fixture();
        let backend = VerdictBackend::failing();
        let err = evaluate(&backend, &case, &transcript, &submission, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Oracle(_)));
    }

    #[test]
    fn test_non_json_verdict_is_malformed() {
        let err = parse_verdict("the patient did great").unwrap_err();
        assert!(matches!(err, EvaluationError::Malformed(_)));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = parse_verdict(r#"{"score": 85, "criteriaMet": []}"#).unwrap_err();
        assert!(matches!(err, EvaluationError::Malformed(_)));
    }

    #[test]
    fn test_non_numeric_score_is_malformed() {
        let verdict = r#"{
            "score": "eighty five",
            "criteriaMet": [],
            "diagnosisScore": 50,
            "diagnosisFeedback": "x",
            "feedback": "y"
        }"#;
        let err = parse_verdict(verdict).unwrap_err();
        assert!(matches!(err, EvaluationError::Malformed(_)));
    }

    #[test]
    fn test_out_of_range_score_is_malformed() {
        let verdict = r#"{
            "score": 120,
            "criteriaMet": [],
            "diagnosisScore": 50,
            "diagnosisFeedback": "x",
            "feedback": "y"
        }"#;
        let err = parse_verdict(verdict).unwrap_err();
        match err {
            EvaluationError::Malformed(msg) => assert!(msg.contains("score=120")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_verdict_with_surrounding_whitespace_parses() {
        let padded = format!("\n  {GOOD_VERDICT}  \n");
        let result = parse_verdict(&padded).unwrap();
        assert_eq!(result.score, 85);
    }
}
