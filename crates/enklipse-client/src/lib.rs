//! Client for the Enklipse clip API.
//!
//! This crate talks to the external render backend:
//! - one-shot clip snapshots, submission, listing and publishing over HTTP
//! - the `clip-status` server-sent-events feed
//! - sealing the viewer identity into the stream's URL token
//!
//! The [`ClipQueryService`] and [`ClipEventSource`] traits are the seams the
//! status controller is written against.

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod service;
pub mod sse;
pub mod token;

pub use client::ClipApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use identity::Identity;
pub use service::{ClipEventSource, ClipEventStream, ClipQueryService, CredentialProvider, StaticCredentials};
pub use sse::{SseDecoder, SseFrame};
pub use token::IdentitySealer;
