//! Conversation sessions.
//!
//! Phase machine and busy-flag turn discipline, see ARCHITECTURE.md
//! §5.1 and §5.2. Turns come in a split form (`begin_turn` /
//! `commit_turn` / `abort_turn`) so callers can release their session
//! lock while the oracle call is in flight, and a one-call `ask` for
//! everything else.

use std::sync::Arc;
use std::time::Instant;

use nursesim_core::{ChatMessage, PatientCase, Role};
use nursesim_llm::audit::OracleAuditEntry;
use nursesim_llm::backend::{GenRequest, GenerativeBackend, OracleError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::prompt;

/// Stand-in line committed when the oracle answers with empty text, so
/// a student turn is never left without a patient reply.
pub const PLACEHOLDER_REPLY: &str = "...";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("utterance is empty")]
    EmptyUtterance,
    #[error("another oracle call is in flight")]
    Busy,
    #[error("session has not been opened")]
    NotOpened,
    #[error("session is already open")]
    AlreadyOpen,
    #[error("session is closed")]
    Closed,
    #[error("no patient line to speak")]
    NoSpeechText,
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Initializing,
    Active,
    Closed,
}

/// In-flight interview turn. The session stays busy until it is
/// settled with `commit_turn` or `abort_turn`.
#[derive(Debug)]
pub struct TurnTicket {
    utterance: String,
    request: GenRequest,
}

impl TurnTicket {
    pub fn request(&self) -> &GenRequest {
        &self.request
    }
}

/// In-flight speech playback; settled with `end_speech`.
#[derive(Debug)]
pub struct SpeechTicket {
    text: String,
}

impl SpeechTicket {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One student's encounter with one case.
pub struct ConversationSession {
    id: Uuid,
    case: Arc<PatientCase>,
    transcript: Vec<ChatMessage>,
    phase: SessionPhase,
    busy: bool,
}

impl ConversationSession {
    pub fn new(case: Arc<PatientCase>) -> Self {
        Self {
            id: Uuid::new_v4(),
            case,
            transcript: Vec::new(),
            phase: SessionPhase::Initializing,
            busy: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn case(&self) -> &PatientCase {
        &self.case
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Move from Initializing to Active, seeding the transcript with
    /// the patient's greeting. Returns the greeting message so the
    /// caller can hand it to speech synthesis.
    pub fn open(&mut self) -> Result<ChatMessage, SessionError> {
        match self.phase {
            SessionPhase::Initializing => {
                let message = ChatMessage::model(prompt::greeting(&self.case.profile));
                self.transcript.push(message.clone());
                self.phase = SessionPhase::Active;
                tracing::debug!(session = %self.id, case = %self.case.id, "session opened");
                Ok(message)
            }
            SessionPhase::Active => Err(SessionError::AlreadyOpen),
            SessionPhase::Closed => Err(SessionError::Closed),
        }
    }

    /// First half of an interview turn: validates the utterance, marks
    /// the session busy, and builds the oracle request. Nothing is
    /// appended yet; a failed call must leave the transcript
    /// byte-identical.
    pub fn begin_turn(&mut self, utterance: &str) -> Result<TurnTicket, SessionError> {
        match self.phase {
            SessionPhase::Initializing => return Err(SessionError::NotOpened),
            SessionPhase::Closed => return Err(SessionError::Closed),
            SessionPhase::Active => {}
        }
        if self.busy {
            return Err(SessionError::Busy);
        }
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance);
        }

        let request = prompt::patient_request(&self.case, &self.transcript, utterance);
        self.busy = true;
        Ok(TurnTicket {
            utterance: utterance.to_string(),
            request,
        })
    }

    /// Second half of a successful turn: commits the student utterance
    /// and the patient reply together. A blank reply is recorded as
    /// the placeholder line.
    pub fn commit_turn(&mut self, ticket: TurnTicket, reply: &str) -> ChatMessage {
        let reply = if reply.trim().is_empty() {
            PLACEHOLDER_REPLY
        } else {
            reply
        };
        self.transcript.push(ChatMessage::user(ticket.utterance));
        let message = ChatMessage::model(reply);
        self.transcript.push(message.clone());
        self.busy = false;
        tracing::debug!(session = %self.id, turns = self.transcript.len(), "turn committed");
        message
    }

    /// Settle a failed turn: the transcript is untouched and the
    /// session stays Active, ready for a retry.
    pub fn abort_turn(&mut self, _ticket: TurnTicket) {
        self.busy = false;
    }

    /// Complete interview turn in one call. Web handlers prefer the
    /// split form so their session lock is not held across the await.
    pub async fn ask(
        &mut self,
        backend: &dyn GenerativeBackend,
        utterance: &str,
    ) -> Result<ChatMessage, SessionError> {
        let ticket = self.begin_turn(utterance)?;
        let started = Instant::now();
        match backend.generate(ticket.request.clone()).await {
            Ok(resp) => {
                OracleAuditEntry::new(
                    Some(self.id.to_string()),
                    resp.model.clone(),
                    "generate".to_string(),
                    resp.prompt_tokens,
                    resp.completion_tokens,
                    &resp.text,
                    started.elapsed().as_millis() as u64,
                )
                .record();
                Ok(self.commit_turn(ticket, &resp.text))
            }
            Err(e) => {
                self.abort_turn(ticket);
                Err(e.into())
            }
        }
    }

    /// Mark the session busy for speech playback. With no explicit
    /// text, the latest patient line is spoken. Input stays blocked
    /// until `end_speech`.
    pub fn begin_speech(&mut self, text: Option<String>) -> Result<SpeechTicket, SessionError> {
        match self.phase {
            SessionPhase::Initializing => return Err(SessionError::NotOpened),
            SessionPhase::Closed => return Err(SessionError::Closed),
            SessionPhase::Active => {}
        }
        if self.busy {
            return Err(SessionError::Busy);
        }
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => self
                .transcript
                .iter()
                .rev()
                .find(|m| m.role == Role::Model)
                .map(|m| m.text.clone())
                .ok_or(SessionError::NoSpeechText)?,
        };
        self.busy = true;
        Ok(SpeechTicket { text })
    }

    pub fn end_speech(&mut self, _ticket: SpeechTicket) {
        self.busy = false;
    }

    /// Close the encounter and hand back the transcript for
    /// evaluation. Further turns are rejected.
    pub fn finish(&mut self) -> Result<Vec<ChatMessage>, SessionError> {
        match self.phase {
            SessionPhase::Initializing => Err(SessionError::NotOpened),
            SessionPhase::Closed => Err(SessionError::Closed),
            SessionPhase::Active => {
                if self.busy {
                    return Err(SessionError::Busy);
                }
                self.phase = SessionPhase::Closed;
                tracing::debug!(session = %self.id, turns = self.transcript.len(), "session closed");
                Ok(self.transcript.clone())
            }
        }
    }
}
