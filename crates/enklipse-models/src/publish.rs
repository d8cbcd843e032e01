//! Publishing a finished clip to connected social accounts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::ClipId;

/// Connected platform a clip can be pushed to by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[non_exhaustive]
pub enum ConnectionType {
    #[serde(rename = "Y")]
    Youtube,
}

impl ConnectionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionType::Youtube => "YouTube",
        }
    }
}

/// Request body for `POST /connections/publish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub connection_types: Vec<ConnectionType>,
    pub clip_id: ClipId,
}

impl PublishRequest {
    pub fn youtube(clip_id: impl Into<ClipId>) -> Self {
        Self {
            connection_types: vec![ConnectionType::Youtube],
            clip_id: clip_id.into(),
        }
    }
}
