//! Clip API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;
use validator::Validate;

use enklipse_models::{
    Clip, ClipId, ClipPage, CreateClipRequest, CreateClipResponse, PageRequest, PublishRequest,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::service::{
    ClipEventSource, ClipEventStream, ClipQueryService, CredentialProvider, StaticCredentials,
};
use crate::sse::decode_status_events;

const LAST_EVENT_ID: &str = "Last-Event-ID";

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// Client for the clip API.
pub struct ClipApiClient {
    http: Client,
    /// Long-lived stream connections must not be cut by the request timeout.
    stream_http: Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
}

impl ClipApiClient {
    /// Create a new client.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialProvider>) -> ClientResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid API URL '{}': {}", config.base_url, e)))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        let stream_http = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            http,
            stream_http,
            config,
            credentials,
        })
    }

    /// Create from environment variables, using the configured static token.
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env();
        let credentials = Arc::new(StaticCredentials::new(config.api_token.clone()));
        Self::new(config, credentials)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn authorized(&self, builder: RequestBuilder) -> ClientResult<RequestBuilder> {
        match self.credentials.bearer_token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Fetch a clip snapshot with a single request.
    pub async fn fetch_clip_once(&self, clip_id: &ClipId) -> ClientResult<Clip> {
        let url = self.endpoint(&format!("clips/{}", urlencoding::encode(clip_id.as_str())));
        debug!(clip_id = %clip_id, "Fetching clip snapshot from {}", url);

        let response = self.authorized(self.http.get(&url)).await?.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Submit a script for rendering. The request is validated locally first.
    pub async fn create_clip(&self, request: &CreateClipRequest) -> ClientResult<CreateClipResponse> {
        request.validate()?;

        let url = self.endpoint("clip");
        info!(
            title = %request.title,
            narrator = %request.narrator,
            words = request.word_count(),
            "Submitting clip"
        );

        let response = self
            .authorized(self.http.post(&url).json(request))
            .await?
            .send()
            .await?;
        let response = check_status(response).await?;
        let created: CreateClipResponse = response.json().await?;

        info!(clip_id = %created.clip_id, "Clip accepted for rendering");
        Ok(created)
    }

    /// List the caller's clips, one page at a time.
    pub async fn list_clips(&self, page: PageRequest) -> ClientResult<ClipPage> {
        let url = self.endpoint("clips");

        self.with_retry(|| async {
            let response = self
                .authorized(self.http.get(&url).query(&page.query_pairs()))
                .await?
                .send()
                .await?;
            let response = check_status(response).await?;
            Ok(response.json::<ClipPage>().await?)
        })
        .await
    }

    /// Ask the backend to publish a finished clip to connected accounts.
    pub async fn publish(&self, request: &PublishRequest) -> ClientResult<()> {
        if self.credentials.bearer_token().await?.is_none() {
            return Err(ClientError::AuthenticationMissing);
        }

        let url = self.endpoint("connections/publish");
        info!(clip_id = %request.clip_id, "Publishing clip");

        let response = self
            .authorized(self.http.post(&url).json(request))
            .await?
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Build the status stream URL for a clip and sealed viewer token.
    pub fn status_stream_url(&self, clip_id: &ClipId, token: &str) -> ClientResult<Url> {
        let raw = self.endpoint(&format!("clip-status/{}", urlencoding::encode(clip_id.as_str())));
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Config(format!("Invalid stream URL '{}': {}", raw, e)))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    /// Open the `clip-status` event stream for a clip, resuming after
    /// `last_event_id` when one is given.
    pub async fn open_status_stream(
        &self,
        clip_id: &ClipId,
        token: &str,
        last_event_id: Option<&str>,
    ) -> ClientResult<ClipEventStream> {
        let url = self.status_stream_url(clip_id, token)?;
        debug!(clip_id = %clip_id, last_event_id = ?last_event_id, "Opening status stream");

        let mut request = self
            .stream_http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = last_event_id.filter(|id| !id.is_empty()) {
            request = request.header(LAST_EVENT_ID, id);
        }

        let response = request.send().await?;
        let response = check_status(response).await?;

        Ok(decode_status_events(Box::pin(response.bytes_stream())))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ClientResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Clip API request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::InvalidResponse("Unknown error".to_string())))
    }
}

/// Pass 2xx responses through; turn anything else into `ClientError::Api`.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.detail))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    Err(ClientError::api(status, message))
}

#[async_trait]
impl ClipQueryService for ClipApiClient {
    async fn fetch_clip(&self, clip_id: &ClipId) -> ClientResult<Clip> {
        self.fetch_clip_once(clip_id).await
    }
}

#[async_trait]
impl ClipEventSource for ClipApiClient {
    async fn subscribe(
        &self,
        clip_id: &ClipId,
        token: &str,
        last_event_id: Option<&str>,
    ) -> ClientResult<ClipEventStream> {
        self.open_status_stream(clip_id, token, last_event_id).await
    }
}
