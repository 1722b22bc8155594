//! nursesim-llm: generative oracle abstraction layer.
//! Implements the GenerativeBackend trait over the Gemini API,
//! as described in ARCHITECTURE.md §3.

pub mod audit;
pub mod backend;
