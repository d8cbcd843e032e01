//! Model error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown clip status: {0}")]
    UnknownStatus(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
