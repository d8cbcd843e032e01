//! Status stream metrics.
//!
//! Counters only; the embedding application installs whatever recorder it
//! wants. Without one, every call is a no-op.

use metrics::counter;

use crate::view::Outcome;

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Status stream connections opened (first connect and reconnects).
    pub const STREAM_OPENED_TOTAL: &str = "clip_stream_opened_total";

    /// Reconnects scheduled after a transport error.
    pub const STREAM_RECONNECTS_TOTAL: &str = "clip_stream_reconnects_total";

    /// `clip-status` events applied to a view.
    pub const STREAM_EVENTS_TOTAL: &str = "clip_stream_events_total";

    /// Clips observed reaching a terminal state, by status.
    pub const TERMINAL_TOTAL: &str = "clip_status_terminal_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

pub fn record_stream_opened() {
    counter!(names::STREAM_OPENED_TOTAL).increment(1);
}

pub fn record_reconnect() {
    counter!(names::STREAM_RECONNECTS_TOTAL).increment(1);
}

pub fn record_event() {
    counter!(names::STREAM_EVENTS_TOTAL).increment(1);
}

pub fn record_terminal(outcome: Outcome) {
    let status = match outcome {
        Outcome::Succeeded => "succeeded",
        Outcome::Failed => "failed",
    };
    counter!(names::TERMINAL_TOTAL, "status" => status).increment(1);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::STREAM_OPENED_TOTAL.ends_with("_total"));
        assert!(names::STREAM_RECONNECTS_TOTAL.contains("reconnects"));
        assert!(names::TERMINAL_TOTAL.starts_with("clip_status"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_stream_opened();
        record_reconnect();
        record_event();
        record_terminal(Outcome::Failed);
    }
}
