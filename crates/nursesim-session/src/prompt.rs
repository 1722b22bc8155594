//! Prompt and request templates for the oracle calls.
//!
//! All user-facing simulation text is Thai; the framing instructions
//! around it are English, which the models follow more reliably.

use nursesim_core::{ChatMessage, DiagnosisSubmission, PatientCase, PatientProfile, Role};
use nursesim_llm::backend::{GenRequest, Turn};

/// Opening line the patient greets the student with.
pub fn greeting(profile: &PatientProfile) -> String {
    format!(
        "สวัสดีครับ/ค่ะ ฉันคือ {} มาด้วยอาการ {} ค่ะ",
        profile.name, profile.chief_complaint
    )
}

/// System instruction that keeps the oracle in character. The criteria
/// hint block is the only place keywords and expected responses reach
/// the model; nothing matches them locally.
pub fn patient_system_instruction(case: &PatientCase) -> String {
    let hints: Vec<String> = case
        .criteria
        .iter()
        .map(|c| format!("- {}: {}", c.label, c.expected_response))
        .collect();

    format!(
        "You are an actor playing a patient for a nursing simulation.\n\
         Patient Profile:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - Chief Complaint: {complaint}\n\
         - Background: {background}\n\
         - Personality: {personality}\n\
         \n\
         Instruction:\n\
         - Respond in Thai.\n\
         - Stay in character.\n\
         - Be concise.\n\
         - Use the provided info for history taking.\n\
         \n\
         Expected Information for Nursing Assessment:\n\
         {hints}",
        name = case.profile.name,
        age = case.profile.age,
        gender = case.profile.gender,
        complaint = case.profile.chief_complaint,
        background = case.profile.detailed_background,
        personality = case.profile.personality,
        hints = hints.join("\n"),
    )
}

/// Request for one interview turn: full history plus the new utterance.
pub fn patient_request(
    case: &PatientCase,
    transcript: &[ChatMessage],
    utterance: &str,
) -> GenRequest {
    let mut turns = turns_from_transcript(transcript);
    turns.push(Turn::user(utterance));
    GenRequest {
        system_instruction: Some(patient_system_instruction(case)),
        turns,
        temperature: Some(0.7),
        max_output_tokens: None,
        response_schema: None,
    }
}

/// The grading prompt: everything the oracle needs to judge one
/// encounter in a single request.
pub fn grading_prompt(
    case: &PatientCase,
    transcript: &[ChatMessage],
    submission: &DiagnosisSubmission,
) -> Result<String, serde_json::Error> {
    let criteria_json = serde_json::to_string(&case.criteria)?;
    let transcript_json = serde_json::to_string(transcript)?;

    Ok(format!(
        "Review this nursing session.\n\
         Case Title: {title}\n\
         Criteria to cover: {criteria_json}\n\
         Expected Diagnosis: {expected}\n\
         Expected Rationale: {expected_rationale}\n\
         \n\
         Student's Work:\n\
         - Interview History: {transcript_json}\n\
         - Student's Diagnosis: {diagnosis}\n\
         - Student's Rationale: {rationale}\n\
         \n\
         Tasks:\n\
         1. Evaluate history taking completeness (which criteria IDs were met).\n\
         2. Evaluate diagnosis accuracy (0-100 score).\n\
         3. Provide feedback in Thai focusing on clinical reasoning.\n\
         Return a JSON object.",
        title = case.title,
        expected = case.expected_diagnosis.as_deref().unwrap_or(""),
        expected_rationale = case.diagnosis_rationale.as_deref().unwrap_or(""),
        diagnosis = submission.diagnosis,
        rationale = submission.rationale,
    ))
}

/// Schema the grading oracle is held to. All five fields required.
pub fn evaluation_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "INTEGER", "description": "Total score out of 100" },
            "criteriaMet": { "type": "ARRAY", "items": { "type": "STRING" } },
            "diagnosisScore": { "type": "INTEGER" },
            "diagnosisFeedback": { "type": "STRING", "description": "Feedback for the diagnosis part, in Thai" },
            "feedback": { "type": "STRING", "description": "General clinical feedback in Thai" }
        },
        "required": ["score", "criteriaMet", "diagnosisScore", "diagnosisFeedback", "feedback"]
    })
}

/// Schema-constrained grading request.
pub fn evaluation_request(
    case: &PatientCase,
    transcript: &[ChatMessage],
    submission: &DiagnosisSubmission,
) -> Result<GenRequest, serde_json::Error> {
    Ok(GenRequest {
        system_instruction: None,
        turns: vec![Turn::user(grading_prompt(case, transcript, submission)?)],
        temperature: None,
        max_output_tokens: None,
        response_schema: Some(evaluation_schema()),
    })
}

pub fn turns_from_transcript(transcript: &[ChatMessage]) -> Vec<Turn> {
    transcript
        .iter()
        .map(|m| match m.role {
            Role::User => Turn::user(m.text.clone()),
            Role::Model => Turn::model(m.text.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nursesim_core::CaseCriterion;

    fn sample_case() -> PatientCase {
        let mut case = PatientCase::blank();
        case.title = "Chest Pain".to_string();
        case.profile.name = "นายสมชาย รักดี".to_string();
        case.profile.age = 55;
        case.profile.chief_complaint = "เจ็บแน่นหน้าอก".to_string();
        let mut crit = CaseCriterion::blank();
        crit.id = "crit-1".to_string();
        crit.label = "ลักษณะการเจ็บ".to_string();
        crit.expected_response = "เจ็บแน่นเหมือนมีอะไรทับ".to_string();
        case.criteria.push(crit);
        case.expected_diagnosis = Some("AMI".to_string());
        case
    }

    #[test]
    fn test_greeting_carries_name_and_complaint() {
        let case = sample_case();
        let text = greeting(&case.profile);
        assert!(text.contains("นายสมชาย รักดี"));
        assert!(text.contains("เจ็บแน่นหน้าอก"));
        assert!(text.starts_with("สวัสดี"));
    }

    #[test]
    fn test_system_instruction_embeds_profile_and_hints() {
        let text = patient_system_instruction(&sample_case());
        assert!(text.contains("- Name: นายสมชาย รักดี"));
        assert!(text.contains("- Age: 55"));
        assert!(text.contains("- Respond in Thai."));
        assert!(text.contains("- ลักษณะการเจ็บ: เจ็บแน่นเหมือนมีอะไรทับ"));
    }

    #[test]
    fn test_patient_request_appends_utterance_last() {
        let case = sample_case();
        let history = vec![
            ChatMessage::model("สวัสดีค่ะ"),
            ChatMessage::user("เจ็บตรงไหนคะ"),
            ChatMessage::model("หน้าอกครับ"),
        ];
        let req = patient_request(&case, &history, "เจ็บมานานแค่ไหนแล้วคะ");
        assert_eq!(req.turns.len(), 4);
        assert_eq!(req.turns[3].text, "เจ็บมานานแค่ไหนแล้วคะ");
        assert_eq!(req.temperature, Some(0.7));
        assert!(req.response_schema.is_none());
    }

    #[test]
    fn test_grading_prompt_embeds_criteria_and_submission() {
        let case = sample_case();
        let transcript = vec![ChatMessage::user("เจ็บแบบไหนคะ")];
        let submission = DiagnosisSubmission {
            diagnosis: "กล้ามเนื้อหัวใจขาดเลือด".to_string(),
            rationale: "เจ็บร้าวไปแขนซ้าย".to_string(),
        };
        let text = grading_prompt(&case, &transcript, &submission).unwrap();
        assert!(text.contains("\"crit-1\""));
        assert!(text.contains("Expected Diagnosis: AMI"));
        assert!(text.contains("กล้ามเนื้อหัวใจขาดเลือด"));
        assert!(text.contains("เจ็บแบบไหนคะ"));
    }

    #[test]
    fn test_evaluation_request_is_schema_constrained() {
        let case = sample_case();
        let submission = DiagnosisSubmission {
            diagnosis: "AMI".to_string(),
            rationale: String::new(),
        };
        let req = evaluation_request(&case, &[], &submission).unwrap();
        let schema = req.response_schema.unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["score", "criteriaMet", "diagnosisScore", "diagnosisFeedback", "feedback"]
        );
        assert_eq!(req.turns.len(), 1);
    }
}
