//! nursesim-store: persistence for authored cases.
//! Blob store, case repository with seed fallback, and the authoring
//! editor (ARCHITECTURE.md §4).

pub mod blob;
pub mod editor;
pub mod repository;
pub mod seed;

pub use blob::{BlobStore, FileStore, MemoryStore, StoreError};
pub use editor::{CaseDraft, CriterionPatch, SaveError};
pub use repository::{CaseRepository, CASES_KEY};
