//! Clip (render job) models.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Opaque identifier assigned to a clip by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id carries any non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClipId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Render status of a clip.
///
/// Only `Processing -> Succeeded` and `Processing -> Failed` are legal moves;
/// both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClipStatus {
    /// Backend is still rendering
    #[default]
    Processing,
    /// Render finished and the media URL is available
    Succeeded,
    /// Render failed
    Failed,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Processing => "Processing",
            ClipStatus::Succeeded => "Succeeded",
            ClipStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClipStatus::Succeeded | ClipStatus::Failed)
    }
}

impl fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClipStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "I" => Ok(ClipStatus::Processing),
            "S" => Ok(ClipStatus::Succeeded),
            "E" => Ok(ClipStatus::Failed),
            other => match other.to_ascii_lowercase().as_str() {
                "processing" => Ok(ClipStatus::Processing),
                "succeeded" => Ok(ClipStatus::Succeeded),
                "failed" => Ok(ClipStatus::Failed),
                _ => Err(ModelError::UnknownStatus(other.to_string())),
            },
        }
    }
}

impl Serialize for ClipStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClipStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A render segment reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub seg_id: u32,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles_url: Option<String>,
}

/// Snapshot of a clip as returned by `GET /clips/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Clip ID
    #[serde(rename = "clipId", alias = "id")]
    pub id: ClipId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub script: String,

    #[schemars(with = "String")]
    pub status: ClipStatus,

    /// Rendered video; only meaningful once the clip succeeded
    #[serde(
        rename = "clipUrl",
        alias = "mediaUrl",
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_url: Option<String>,

    #[serde(
        default,
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<Segment>,
}

impl Clip {
    /// Create a clip that is still rendering.
    pub fn processing(id: impl Into<ClipId>, title: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            script: script.into(),
            status: ClipStatus::Processing,
            media_url: None,
            thumbnail_url: None,
            segments: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Mark the clip as succeeded, copying over any media URL and final script.
    ///
    /// Returns `false` without touching the clip when it is already terminal.
    pub fn mark_succeeded(&mut self, media_url: Option<&str>, script: Option<&str>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = ClipStatus::Succeeded;
        if let Some(url) = media_url.filter(|u| !u.is_empty()) {
            self.media_url = Some(url.to_string());
        }
        if let Some(script) = script.filter(|s| !s.is_empty()) {
            self.script = script.to_string();
        }
        true
    }

    /// Mark the clip as failed. Returns `false` when it is already terminal.
    pub fn mark_failed(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = ClipStatus::Failed;
        self.media_url = None;
        true
    }

    /// Media URL, but only when the clip actually succeeded.
    pub fn playable_url(&self) -> Option<&str> {
        match self.status {
            ClipStatus::Succeeded => self.media_url.as_deref(),
            _ => None,
        }
    }
}

/// Latest render progress received from the status stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressSnapshot {
    /// Progress percentage (0-100)
    pub percentage: u8,
    /// Human-readable step description
    pub message: String,
}

impl ProgressSnapshot {
    pub fn new(percentage: u8, message: impl Into<String>) -> Self {
        Self {
            percentage: percentage.min(100),
            message: message.into(),
        }
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
