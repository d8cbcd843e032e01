//! `clip-status` stream events.
//!
//! Each server-sent event named [`CLIP_STATUS_EVENT`] carries one JSON payload
//! describing render progress for a single clip.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clip::ClipStatus;

/// Event name used by the status stream.
pub const CLIP_STATUS_EVENT: &str = "clip-status";

/// Progress update pushed by the status stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipStatusEvent {
    /// Progress percentage, rounded down and clamped to 0-100
    #[serde(default, deserialize_with = "clamped_percentage")]
    #[schemars(with = "f64")]
    pub percentage: u8,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub status: Option<ClipStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// SSE `id:` in effect when the event was dispatched; not part of the payload.
    #[serde(skip)]
    #[schemars(skip)]
    pub event_id: Option<String>,
}

impl ClipStatusEvent {
    /// Create a plain progress event.
    pub fn progress(percentage: u8, message: impl Into<String>) -> Self {
        Self {
            percentage: percentage.min(100),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Create a completion event carrying the rendered media URL.
    pub fn succeeded(media_url: impl Into<String>) -> Self {
        Self {
            percentage: 100,
            message: "Complete".to_string(),
            media_url: Some(media_url.into()),
            status: Some(ClipStatus::Succeeded),
            ..Default::default()
        }
    }

    /// Create a failure event.
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            message: error.clone(),
            status: Some(ClipStatus::Failed),
            error: Some(error),
            ..Default::default()
        }
    }

    /// The render finished: either 100% or an explicit `Succeeded` status.
    pub fn is_success(&self) -> bool {
        !self.is_failure() && (self.percentage >= 100 || self.status == Some(ClipStatus::Succeeded))
    }

    pub fn is_failure(&self) -> bool {
        self.status == Some(ClipStatus::Failed)
    }

}

fn clamped_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(v) if v.is_finite() => v.floor().clamp(0.0, 100.0) as u8,
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"percentage": 40, "message": "Rendering"}"#;
        let event: ClipStatusEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.percentage, 40);
        assert_eq!(event.message, "Rendering");
        assert!(!event.is_success());
        assert!(!event.is_failure());
        assert_eq!(event.event_id, None);
    }

    #[test]
    fn test_percentage_is_clamped() {
        let event: ClipStatusEvent = serde_json::from_str(r#"{"percentage": 150.4, "message": ""}"#).unwrap();
        assert_eq!(event.percentage, 100);
        let event: ClipStatusEvent = serde_json::from_str(r#"{"percentage": -3, "message": ""}"#).unwrap();
        assert_eq!(event.percentage, 0);
        let event: ClipStatusEvent = serde_json::from_str(r#"{"percentage": 33.6, "message": ""}"#).unwrap();
        assert_eq!(event.percentage, 33);
    }

    #[test]
    fn test_fractional_percentage_below_complete_is_not_success() {
        let event: ClipStatusEvent = serde_json::from_str(r#"{"percentage": 99.6, "message": "Finalizing"}"#).unwrap();
        assert_eq!(event.percentage, 99);
        assert!(!event.is_success());
    }

    #[test]
    fn test_success_detection() {
        let by_percentage = ClipStatusEvent::progress(100, "done");
        assert!(by_percentage.is_success());

        let json = r#"{"percentage": 100, "message": "", "status": "Succeeded", "mediaUrl": "https://x/y.mp4"}"#;
        let event: ClipStatusEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_success());
        assert_eq!(event.media_url.as_deref(), Some("https://x/y.mp4"));
    }

    #[test]
    fn test_failure_wins_over_percentage() {
        let json = r#"{"percentage": 100, "message": "boom", "status": "Failed", "error": "encoder crashed"}"#;
        let event: ClipStatusEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_failure());
        assert!(!event.is_success());
    }
}
