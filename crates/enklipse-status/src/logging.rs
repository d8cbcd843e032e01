//! Structured per-clip logging.

use tracing::{debug, error, info, warn, Span};

use enklipse_models::ClipId;

/// Clip logger for structured logging with consistent formatting.
///
/// Every line carries the clip ID and the operation being performed.
#[derive(Debug, Clone)]
pub struct ClipLogger {
    clip_id: String,
    operation: String,
}

impl ClipLogger {
    pub fn new(clip_id: &ClipId, operation: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            clip_id = %self.clip_id,
            operation = %self.operation,
            "Clip watch started: {}", message
        );
    }

    pub fn log_progress(&self, percentage: u8, message: &str) {
        debug!(
            clip_id = %self.clip_id,
            operation = %self.operation,
            percentage,
            "Clip progress: {}", message
        );
    }

    pub fn log_reconnect(&self, attempt: u32, delay_ms: u64, reason: &str) {
        warn!(
            clip_id = %self.clip_id,
            operation = %self.operation,
            attempt,
            delay_ms,
            "Status stream dropped, reconnecting: {}", reason
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            clip_id = %self.clip_id,
            operation = %self.operation,
            "Clip error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            clip_id = %self.clip_id,
            operation = %self.operation,
            "Clip finished: {}", message
        );
    }

    pub fn clip_id(&self) -> &str {
        &self.clip_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span for instrumenting a clip's driver task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "clip",
            clip_id = %self.clip_id,
            operation = %self.operation
        )
    }
}
