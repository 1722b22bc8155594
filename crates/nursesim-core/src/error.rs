use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Carries the wire names of every field that failed validation.
    #[error("case validation failed: {}", .0.join(", "))]
    InvalidCase(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CoreError>;
