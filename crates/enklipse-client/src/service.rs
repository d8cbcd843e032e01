//! Service seams consumed by the status controller.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use enklipse_models::{Clip, ClipId, ClipStatusEvent};

use crate::error::ClientResult;

/// Live feed of status events for one clip.
///
/// Dropping the stream closes the underlying connection.
pub type ClipEventStream = Pin<Box<dyn Stream<Item = ClientResult<ClipStatusEvent>> + Send>>;

/// One-shot clip snapshot lookup.
#[async_trait]
pub trait ClipQueryService: Send + Sync {
    /// Fetch the current persisted state of a clip. Issues exactly one request.
    async fn fetch_clip(&self, clip_id: &ClipId) -> ClientResult<Clip>;
}

/// Opens status streams scoped to one clip and a sealed viewer token.
#[async_trait]
pub trait ClipEventSource: Send + Sync {
    /// Open a stream. `last_event_id` resumes after the last event a previous
    /// connection delivered.
    async fn subscribe(
        &self,
        clip_id: &ClipId,
        token: &str,
        last_event_id: Option<&str>,
    ) -> ClientResult<ClipEventStream>;
}

/// Supplies the bearer credential for authenticated calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> ClientResult<Option<String>>;
}

/// Credential provider backed by a fixed token.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> ClientResult<Option<String>> {
        Ok(self.token.clone())
    }
}
