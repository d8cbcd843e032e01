//! Controller error types.
//!
//! Remote failures never surface here; they become view states and
//! notifications. These errors only describe misuse of the controller.

use thiserror::Error;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Controller has been disposed")]
    Disposed,

    #[error("Controller already initialized")]
    AlreadyInitialized,

    #[error("Clip id must not be empty")]
    InvalidClipId,

    #[error("No authentication token available")]
    AuthenticationMissing,
}
