//! Pure view transitions.
//!
//! Every function here mutates a [`ClipView`] in place and refuses to touch a
//! view that already reached a terminal state. The controller decides when a
//! transition is allowed to run at all (cancellation); this module decides
//! what it does.

use enklipse_models::{Clip, ClipId, ClipStatus, ClipStatusEvent, ProgressSnapshot};

use crate::policy::ProgressPolicy;
use crate::view::{ClipView, ErrorKind, Outcome, ViewError, ViewState, FAILED_MESSAGE};

/// Result of applying a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The clip already finished; nothing to stream.
    Ready(Outcome),
    /// The clip is still rendering; a stream should be opened.
    Stream,
    Ignored,
}

/// Result of applying one stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Progress,
    Succeeded,
    Failed { message: String },
    Ignored,
}

/// `Idle → FetchingSnapshot`. Only valid once.
pub fn begin_snapshot(view: &mut ClipView, clip_id: &ClipId) -> bool {
    if view.state != ViewState::Idle {
        return false;
    }
    view.clip_id = Some(clip_id.clone());
    view.state = ViewState::FetchingSnapshot;
    true
}

pub fn apply_snapshot(view: &mut ClipView, clip: Clip) -> SnapshotOutcome {
    if view.state != ViewState::FetchingSnapshot {
        return SnapshotOutcome::Ignored;
    }

    let status = clip.status;
    view.clip = Some(clip);
    match status {
        ClipStatus::Succeeded => {
            view.state = ViewState::ready(Outcome::Succeeded);
            SnapshotOutcome::Ready(Outcome::Succeeded)
        }
        ClipStatus::Failed => {
            view.state = ViewState::ready(Outcome::Failed);
            view.error = Some(ViewError {
                kind: ErrorKind::JobFailed,
                message: FAILED_MESSAGE.to_string(),
            });
            SnapshotOutcome::Ready(Outcome::Failed)
        }
        ClipStatus::Processing => {
            view.state = ViewState::Streaming;
            SnapshotOutcome::Stream
        }
    }
}

/// Enter `Streaming` for a new connection.
///
/// A view that never saw a snapshot gets a placeholder clip in `Processing`.
pub fn begin_stream(view: &mut ClipView, clip_id: &ClipId) -> bool {
    if view.state.is_terminal() {
        return false;
    }
    if view.clip_id.is_none() {
        view.clip_id = Some(clip_id.clone());
    }
    view.clip
        .get_or_insert_with(|| Clip::processing(clip_id.clone(), "", ""));
    view.state = ViewState::Streaming;
    true
}

pub fn apply_event(view: &mut ClipView, event: &ClipStatusEvent, policy: ProgressPolicy) -> EventOutcome {
    if view.state.is_terminal() {
        return EventOutcome::Ignored;
    }

    let percentage = policy.merge(view.percentage(), event.percentage);
    view.progress = Some(ProgressSnapshot::new(percentage, event.message.clone()));

    if event.is_failure() {
        if let Some(clip) = view.clip.as_mut() {
            clip.mark_failed();
        }
        let message = event
            .error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(FAILED_MESSAGE)
            .to_string();
        view.state = ViewState::ready(Outcome::Failed);
        view.error = Some(ViewError {
            kind: ErrorKind::JobFailed,
            message: message.clone(),
        });
        return EventOutcome::Failed { message };
    }

    if event.is_success() {
        if let Some(clip) = view.clip.as_mut() {
            clip.mark_succeeded(event.media_url.as_deref(), event.script.as_deref());
        }
        view.state = ViewState::ready(Outcome::Succeeded);
        return EventOutcome::Succeeded;
    }

    EventOutcome::Progress
}

/// `Reconnecting → Streaming` once a new connection is up.
pub fn resume_stream(view: &mut ClipView) -> bool {
    if let ViewState::Reconnecting { .. } = view.state {
        view.state = ViewState::Streaming;
        return true;
    }
    false
}

/// `Streaming → Reconnecting{attempt}`.
pub fn begin_reconnect(view: &mut ClipView, attempt: u32) -> bool {
    if view.state.is_terminal() {
        return false;
    }
    view.state = ViewState::Reconnecting { attempt };
    true
}

/// Move to `Error(kind)` unless already terminal.
pub fn fail(view: &mut ClipView, kind: ErrorKind, message: impl Into<String>) -> bool {
    if view.state.is_terminal() {
        return false;
    }
    view.state = ViewState::error(kind);
    view.error = Some(ViewError {
        kind,
        message: message.into(),
    });
    true
}
