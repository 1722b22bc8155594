//! nursesim-session: the interview and evaluation workflow.
//! Conversation sessions with the busy-flag turn discipline, diagnosis
//! capture, and the evaluation orchestrator (ARCHITECTURE.md §5).

pub mod diagnosis;
pub mod evaluate;
pub mod prompt;
pub mod session;

pub use diagnosis::{DiagnosisError, DiagnosisForm, FormState};
pub use evaluate::{evaluate, EvaluationError};
pub use session::{ConversationSession, SessionError, SessionPhase, SpeechTicket, TurnTicket};
