//! Audit records for oracle calls.
//! See ARCHITECTURE.md §3.3

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleAuditEntry {
    pub id: Uuid,
    pub session_id: Option<String>,
    pub model: String,
    /// "generate" | "speak" | "portrait"
    pub operation: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl OracleAuditEntry {
    pub fn new(
        session_id: Option<String>,
        model: String,
        operation: String,
        prompt_tokens: u32,
        completion_tokens: u32,
        output: impl AsRef<[u8]>,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(output.as_ref());
        let output_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            session_id,
            model,
            operation,
            prompt_tokens,
            completion_tokens,
            output_hash,
            latency_ms,
            called_at: Utc::now(),
        }
    }

    /// Emit the entry on the audit target. Model output is never
    /// logged, only its hash.
    pub fn record(&self) {
        tracing::info!(
            target: "nursesim::audit",
            id = %self.id,
            session = self.session_id.as_deref().unwrap_or("-"),
            model = %self.model,
            operation = %self.operation,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_hash = %self.output_hash,
            latency_ms = self.latency_ms,
            "oracle call",
        );
    }
}
