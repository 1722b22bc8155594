//! nursesim-web: HTTP API for the nursing interview simulator.
//! Serves the case library and the live patient encounters:
//!   - Case library endpoints for instructors
//!   - Interview sessions against AI-portrayed patients
//!   - Speech synthesis for patient replies
//!   - Grading of finished encounters
//!   - SSE event stream for connected clients

pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod error;
