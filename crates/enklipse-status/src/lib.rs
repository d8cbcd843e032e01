//! Clip generation status tracking.
//!
//! [`ClipStatusController`] observes one render job from its first snapshot to
//! a terminal state, following the live `clip-status` stream in between and
//! publishing a [`ClipView`] for the presentation layer.

pub mod controller;
pub mod error;
pub mod logging;
pub mod machine;
pub mod metrics;
pub mod notify;
pub mod policy;
pub mod view;

pub use controller::{ApiClipStatusController, ClipStatusController};
pub use error::{ControllerError, ControllerResult};
pub use logging::ClipLogger;
pub use notify::{ChannelSink, RecordingSink, Notification, NotificationLevel, NotificationSink, TracingSink};
pub use policy::{ControllerConfig, ProgressPolicy, ReconnectPolicy};
pub use view::{ClipView, DisplayModel, ErrorKind, Outcome, ViewError, ViewState};
