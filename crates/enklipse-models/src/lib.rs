//! Shared data models for the Enklipse clip client.
//!
//! This crate provides Serde-serializable types for:
//! - Clips (render jobs) and their status
//! - `clip-status` stream events
//! - Clip submission, listing and publishing payloads
//! - The narrator voice catalog

pub mod clip;
pub mod error;
pub mod event;
pub mod narrator;
pub mod page;
pub mod publish;
pub mod request;

// Re-export common types
pub use clip::{Clip, ClipId, ClipStatus, ProgressSnapshot, Segment};
pub use error::ModelError;
pub use event::{ClipStatusEvent, CLIP_STATUS_EVENT};
pub use narrator::{find_voice, Voice, VoiceProvider, DEFAULT_NARRATOR, VOICES};
pub use page::{ClipPage, PageRequest};
pub use publish::{ConnectionType, PublishRequest};
pub use request::{count_words, CreateClipRequest, CreateClipResponse};
