//! Shared application state for the web server.

use std::collections::HashMap;
use std::sync::Arc;

use nursesim_core::EvaluationResult;
use nursesim_llm::backend::GenerativeBackend;
use nursesim_session::{ConversationSession, DiagnosisForm};
use nursesim_store::CaseRepository;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A case was created or updated in the library
    CaseSaved { case_id: String, title: String },
    /// A case was removed from the library
    CaseDeleted { case_id: String },
    /// A student opened a new encounter
    SessionOpened { session_id: String, case_id: String },
    /// The patient answered an interview question
    PatientReplied { session_id: String },
    /// A grading verdict is ready
    EvaluationReady { session_id: String, score: i64 },
    /// General system notification
    Notification { level: String, message: String },
}

/// One student encounter: the live session plus its diagnosis form
/// and, once graded, the verdict.
pub struct SessionEntry {
    pub session: ConversationSession,
    pub form: DiagnosisForm,
    pub result: Option<EvaluationResult>,
}

impl SessionEntry {
    pub fn new(session: ConversationSession) -> Self {
        Self {
            session,
            form: DiagnosisForm::new(),
            result: None,
        }
    }
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub cases: CaseRepository,
    pub oracle: Arc<dyn GenerativeBackend>,
    /// Sessions each sit behind their own lock; the busy flag inside
    /// the session serializes oracle calls even when two requests race.
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionEntry>>>>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(cases: CaseRepository, oracle: Arc<dyn GenerativeBackend>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            cases,
            oracle,
            sessions: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Fan an event out to connected clients. Nobody listening is not
    /// an error.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    pub async fn insert_session(&self, entry: SessionEntry) -> Arc<Mutex<SessionEntry>> {
        let id = entry.session.id();
        let entry = Arc::new(Mutex::new(entry));
        self.sessions.write().await.insert(id, entry.clone());
        entry
    }

    pub async fn session(&self, id: Uuid) -> Option<Arc<Mutex<SessionEntry>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub type SharedState = Arc<AppState>;
