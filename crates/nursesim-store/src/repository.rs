//! Case repository.
//!
//! Holds the authored case collection in memory and persists the whole
//! collection as one snapshot after every mutation.
//! See ARCHITECTURE.md §4.2

use std::sync::Arc;

use nursesim_core::PatientCase;
use tokio::sync::RwLock;

use crate::blob::{BlobStore, Result};
use crate::seed;

/// Storage key of the case snapshot.
pub const CASES_KEY: &str = "cases";

/// Repository for authored cases.
#[derive(Clone)]
pub struct CaseRepository {
    store: Arc<dyn BlobStore>,
    cases: Arc<RwLock<Vec<PatientCase>>>,
}

impl CaseRepository {
    /// Open the repository, loading the persisted snapshot. An absent
    /// or unreadable snapshot falls back to the built-in seed cases.
    pub fn open(store: Arc<dyn BlobStore>) -> Result<Self> {
        let cases = match store.load(CASES_KEY)? {
            Some(bytes) => match serde_json::from_slice::<Vec<PatientCase>>(&bytes) {
                Ok(cases) => cases,
                Err(e) => {
                    tracing::warn!("case snapshot unreadable, starting from seed cases: {e}");
                    seed::seed_cases()
                }
            },
            None => seed::seed_cases(),
        };
        Ok(Self {
            store,
            cases: Arc::new(RwLock::new(cases)),
        })
    }

    /// All cases in insertion order.
    pub async fn list(&self) -> Vec<PatientCase> {
        self.cases.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<PatientCase> {
        self.cases.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }

    /// Replace-by-id or append. The stored case is overwritten whole,
    /// never merged.
    pub async fn upsert(&self, case: PatientCase) -> Result<()> {
        let mut cases = self.cases.write().await;
        match cases.iter_mut().find(|c| c.id == case.id) {
            Some(slot) => *slot = case,
            None => cases.push(case),
        }
        self.persist(&cases)
    }

    /// Remove by id. Unknown ids are a no-op and skip the snapshot
    /// write entirely.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut cases = self.cases.write().await;
        let before = cases.len();
        cases.retain(|c| c.id != id);
        if cases.len() == before {
            return Ok(false);
        }
        self.persist(&cases)?;
        Ok(true)
    }

    fn persist(&self, cases: &[PatientCase]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(cases)?;
        self.store.save(CASES_KEY, &bytes)
    }
}
