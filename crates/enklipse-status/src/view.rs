//! View-model published by the status controller.

use serde::Serialize;

use enklipse_models::{Clip, ClipId, ClipStatus, ProgressSnapshot};

/// How a finished render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Error classes the view can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The snapshot request failed (network, 4xx/5xx).
    SnapshotFetchFailed,
    /// No viewer identity to seal into the stream token.
    AuthenticationMissing,
    /// The render job failed. Shown as `Ready(Failed)`, never as `Error`.
    JobFailed,
    /// Every reconnect attempt was used up.
    StreamExhausted,
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Idle,
    FetchingSnapshot,
    Streaming,
    Reconnecting { attempt: u32 },
    Ready { outcome: Outcome },
    Error { kind: ErrorKind },
}

impl ViewState {
    pub fn ready(outcome: Outcome) -> Self {
        Self::Ready { outcome }
    }

    pub fn error(kind: ErrorKind) -> Self {
        Self::Error { kind }
    }

    /// `Ready` and `Error` are final: nothing moves the view out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Error { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::FetchingSnapshot | Self::Streaming | Self::Reconnecting { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingSnapshot => "fetching_snapshot",
            Self::Streaming => "streaming",
            Self::Reconnecting { .. } => "reconnecting",
            Self::Ready { .. } => "ready",
            Self::Error { .. } => "error",
        }
    }
}

/// Error attached to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything the presentation layer needs to render one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipView {
    pub clip_id: Option<ClipId>,
    pub state: ViewState,
    /// Last known clip snapshot, updated by stream events.
    pub clip: Option<Clip>,
    /// `None` until the first stream event arrives.
    pub progress: Option<ProgressSnapshot>,
    pub error: Option<ViewError>,
    pub disposed: bool,
}

/// What to draw for the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayModel<'a> {
    /// Working, no progress reported yet.
    Spinner,
    Progress { percentage: u8, message: &'a str },
    Player { media_url: Option<&'a str> },
    Failed { message: &'a str },
    Error { message: &'a str },
    Empty,
}

impl ClipView {
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Terminal or disposed; the view will not change any more.
    pub fn is_settled(&self) -> bool {
        self.disposed || self.state.is_terminal()
    }

    pub fn status(&self) -> Option<ClipStatus> {
        self.clip.as_ref().map(|c| c.status)
    }

    /// Whether the last known clip status is still rendering.
    ///
    /// A stream opened without a snapshot has no clip yet and counts as rendering.
    pub fn is_processing(&self) -> bool {
        self.status().map_or(true, |s| s == ClipStatus::Processing)
    }

    pub fn percentage(&self) -> Option<u8> {
        self.progress.as_ref().map(|p| p.percentage)
    }

    pub fn media_url(&self) -> Option<&str> {
        self.clip.as_ref().and_then(Clip::playable_url)
    }

    pub fn display(&self) -> DisplayModel<'_> {
        match self.state {
            ViewState::Idle => DisplayModel::Empty,
            ViewState::Ready {
                outcome: Outcome::Succeeded,
            } => DisplayModel::Player {
                media_url: self.media_url(),
            },
            ViewState::Ready {
                outcome: Outcome::Failed,
            } => DisplayModel::Failed {
                message: self.error_message().unwrap_or(FAILED_MESSAGE),
            },
            ViewState::Error { .. } => DisplayModel::Error {
                message: self.error_message().unwrap_or(FETCH_FAILED_MESSAGE),
            },
            _ => match &self.progress {
                Some(p) => DisplayModel::Progress {
                    percentage: p.percentage,
                    message: &p.message,
                },
                None => DisplayModel::Spinner,
            },
        }
    }

    fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

/// Shown when a snapshot or event reports a failed render.
pub const FAILED_MESSAGE: &str = "Video generation failed. Please try again.";

/// Shown when the snapshot request fails without a server message.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch video data.";

/// Shown while a dropped stream is being reopened.
pub const RECONNECTING_MESSAGE: &str = "Connection lost. Reconnecting...";

/// Shown when reconnect attempts are used up.
pub const EXHAUSTED_MESSAGE: &str = "Lost connection to the render service. Please refresh to check the status.";

/// Shown when no viewer identity is available for the stream.
pub const AUTH_MISSING_MESSAGE: &str = "No authentication token available";
