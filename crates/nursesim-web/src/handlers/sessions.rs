//! Interview session endpoints: opening encounters, interview turns,
//! speech playback, and grading.
//!
//! Handlers never hold a session lock across an oracle await. Each
//! oracle-backed route takes the lock twice: once to validate and mark
//! the session busy, once to settle. A request racing a call in flight
//! observes the busy flag and gets a conflict instead of queueing.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use nursesim_core::{ChatMessage, DiagnosisSubmission, EvaluationResult, Scorecard};
use nursesim_llm::audit::OracleAuditEntry;
use nursesim_session::{evaluate, ConversationSession, SessionPhase};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{AppEvent, SessionEntry, SharedState};

// === API Types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub case_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub case_id: String,
    pub greeting: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct SpeakRequest {
    /// Explicit text to speak; the latest patient line otherwise.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub mime: String,
    pub audio_base64: String,
    pub voice: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishResponse {
    pub session_id: String,
    pub turns: usize,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub result: EvaluationResult,
    pub scorecard: Scorecard,
}

// === API Endpoints ===

/// POST /api/sessions - Open a new encounter against a case
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let case = state
        .cases
        .get(&payload.case_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no case {}", payload.case_id)))?;

    let mut session = ConversationSession::new(Arc::new(case));
    let greeting = session.open()?;
    let session_id = session.id();
    state.insert_session(SessionEntry::new(session)).await;

    tracing::info!(session = %session_id, case = %payload.case_id, "encounter opened");
    state.publish(AppEvent::SessionOpened {
        session_id: session_id.to_string(),
        case_id: payload.case_id.clone(),
    });

    Ok(Json(CreateSessionResponse {
        session_id: session_id.to_string(),
        case_id: payload.case_id,
        greeting,
    }))
}

/// POST /api/sessions/{id}/ask - One interview turn
pub async fn ask(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session {id}")))?;

    let ticket = entry.lock().await.session.begin_turn(&payload.text)?;

    let started = Instant::now();
    let outcome = state.oracle.generate(ticket.request().clone()).await;

    let mut entry = entry.lock().await;
    match outcome {
        Ok(resp) => {
            OracleAuditEntry::new(
                Some(id.to_string()),
                resp.model.clone(),
                "generate".to_string(),
                resp.prompt_tokens,
                resp.completion_tokens,
                &resp.text,
                started.elapsed().as_millis() as u64,
            )
            .record();
            let reply = entry.session.commit_turn(ticket, &resp.text);
            state.publish(AppEvent::PatientReplied {
                session_id: id.to_string(),
            });
            Ok(Json(reply))
        }
        Err(e) => {
            entry.session.abort_turn(ticket);
            Err(ApiError::Oracle(e.to_string()))
        }
    }
}

/// POST /api/sessions/{id}/speak - Synthesize patient speech
///
/// Holds the session busy while audio renders, so a turn cannot start
/// mid-playback.
pub async fn speak(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SpeakRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session {id}")))?;

    let ticket = entry.lock().await.session.begin_speech(payload.text)?;

    let started = Instant::now();
    let outcome = state.oracle.speak(ticket.text(), None).await;
    entry.lock().await.session.end_speech(ticket);

    let clip = outcome.map_err(|e| ApiError::Oracle(e.to_string()))?;
    OracleAuditEntry::new(
        Some(id.to_string()),
        clip.model.clone(),
        "speak".to_string(),
        0,
        0,
        &clip.audio,
        started.elapsed().as_millis() as u64,
    )
    .record();

    Ok(Json(SpeakResponse {
        mime: clip.mime_type,
        audio_base64: BASE64.encode(&clip.audio),
        voice: clip.voice,
    }))
}

/// POST /api/sessions/{id}/finish - Close the interview
pub async fn finish(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session {id}")))?;

    let transcript = entry.lock().await.session.finish()?;
    Ok(Json(FinishResponse {
        session_id: id.to_string(),
        turns: transcript.len(),
        transcript,
    }))
}

/// POST /api/sessions/{id}/evaluate - Grade the interview
///
/// Submitting a diagnosis ends a still-running encounter. On oracle
/// failure the form is released so the student can resubmit.
pub async fn evaluate_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiagnosisSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session {id}")))?;

    let (case, transcript, submission) = {
        let mut entry = entry.lock().await;
        if entry.session.phase() == SessionPhase::Active {
            entry.session.finish()?;
        }
        entry.form.set_diagnosis(payload.diagnosis);
        entry.form.set_rationale(payload.rationale);
        let submission = entry.form.begin_submit()?;
        (
            entry.session.case().clone(),
            entry.session.transcript().to_vec(),
            submission,
        )
    };

    let session_id = id.to_string();
    let verdict = evaluate(
        state.oracle.as_ref(),
        &case,
        &transcript,
        &submission,
        Some(&session_id),
    )
    .await;

    let mut entry = entry.lock().await;
    match verdict {
        Ok(result) => {
            entry.form.settle(true);
            entry.result = Some(result.clone());
            let scorecard = Scorecard::derive(&case, &result);
            tracing::info!(session = %id, score = result.score, "evaluation ready");
            state.publish(AppEvent::EvaluationReady {
                session_id,
                score: result.score,
            });
            Ok(Json(EvaluateResponse { result, scorecard }))
        }
        Err(e) => {
            entry.form.settle(false);
            Err(e.into())
        }
    }
}
