//! Clip status controller.
//!
//! Drives one clip from its first snapshot to a terminal state:
//! - fetch the snapshot once
//! - if the clip is still rendering, follow the `clip-status` stream
//! - reconnect after transport errors while the clip is still processing
//!
//! The view is published through a `watch` channel. Every mutation runs under
//! the channel's write lock after checking the stream's cancellation token, so
//! once [`dispose`](ClipStatusController::dispose) returns, nothing can change
//! the view any more.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use enklipse_client::{ClipApiClient, ClipEventSource, ClipEventStream, ClipQueryService, Identity, IdentitySealer};
use enklipse_models::ClipId;

use crate::error::{ControllerError, ControllerResult};
use crate::logging::ClipLogger;
use crate::machine::{self, EventOutcome, SnapshotOutcome};
use crate::metrics;
use crate::notify::{Notification, NotificationSink};
use crate::policy::ControllerConfig;
use crate::view::{
    ClipView, ErrorKind, Outcome, AUTH_MISSING_MESSAGE, EXHAUSTED_MESSAGE, FAILED_MESSAGE,
    FETCH_FAILED_MESSAGE, RECONNECTING_MESSAGE,
};

/// Controller wired to the HTTP API client for both snapshot and stream.
pub type ApiClipStatusController<N> = ClipStatusController<ClipApiClient, ClipApiClient, N>;

/// State shared between the controller and its stream driver.
struct Shared<S, N> {
    source: Arc<S>,
    notifier: Arc<N>,
    config: ControllerConfig,
    view: watch::Sender<ClipView>,
}

impl<S, N: NotificationSink> Shared<S, N> {
    /// Apply `f` to the view unless `guard` was cancelled.
    ///
    /// Returns `None` when the mutation was refused.
    fn mutate<R>(&self, guard: &CancellationToken, f: impl FnOnce(&mut ClipView) -> R) -> Option<R> {
        let mut out = None;
        self.view.send_if_modified(|view| {
            if guard.is_cancelled() {
                return false;
            }
            out = Some(f(view));
            true
        });
        out
    }

    fn notify(&self, guard: &CancellationToken, notification: Notification) {
        if !guard.is_cancelled() {
            self.notifier.notify(notification);
        }
    }
}

/// The running stream of a controller.
struct ActiveStream {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveStream {
    /// Cancel the driver and wait for it to exit.
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!("Status stream task failed: {}", e);
            }
        }
    }
}

/// Observes one render job and publishes its [`ClipView`].
pub struct ClipStatusController<Q, S, N> {
    query: Arc<Q>,
    sealer: IdentitySealer,
    shared: Arc<Shared<S, N>>,
    /// Held across close, spawn and replace so at most one driver runs.
    active: Mutex<Option<ActiveStream>>,
    /// Cancelled on dispose; every stream token is a child of it.
    lifetime: CancellationToken,
}

impl<Q, S, N> ClipStatusController<Q, S, N>
where
    Q: ClipQueryService + 'static,
    S: ClipEventSource + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        query: Arc<Q>,
        source: Arc<S>,
        notifier: Arc<N>,
        sealer: IdentitySealer,
        config: ControllerConfig,
    ) -> Self {
        let (view, _) = watch::channel(ClipView::default());
        Self {
            query,
            sealer,
            shared: Arc::new(Shared {
                source,
                notifier,
                config,
                view,
            }),
            active: Mutex::new(None),
            lifetime: CancellationToken::new(),
        }
    }

    /// Fetch the clip snapshot and, if it is still rendering, open its stream.
    ///
    /// Remote failures are reported through the view and the notification
    /// sink; the returned error only covers misuse (second call, disposed
    /// controller, empty id).
    pub async fn initialize(&self, clip_id: ClipId, identity: Identity) -> ControllerResult<()> {
        if clip_id.is_blank() {
            return Err(ControllerError::InvalidClipId);
        }
        match self
            .shared
            .mutate(&self.lifetime, |view| machine::begin_snapshot(view, &clip_id))
        {
            None => return Err(ControllerError::Disposed),
            Some(false) => return Err(ControllerError::AlreadyInitialized),
            Some(true) => {}
        }

        let logger = ClipLogger::new(&clip_id, "initialize");
        logger.log_start("fetching snapshot");

        let fetched = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return Ok(()),
            fetched = self.query.fetch_clip(&clip_id) => fetched,
        };

        let clip = match fetched {
            Ok(clip) => clip,
            Err(e) => {
                logger.log_error(&format!("snapshot fetch failed: {}", e));
                let message = e.server_message().unwrap_or(FETCH_FAILED_MESSAGE).to_string();
                let failed = self.shared.mutate(&self.lifetime, |view| {
                    machine::fail(view, ErrorKind::SnapshotFetchFailed, message.clone())
                });
                if failed == Some(true) {
                    self.shared
                        .notify(&self.lifetime, Notification::error("Error", message));
                }
                return Ok(());
            }
        };

        match self
            .shared
            .mutate(&self.lifetime, |view| machine::apply_snapshot(view, clip))
        {
            Some(SnapshotOutcome::Stream) => {
                if let Err(e) = self.open_stream(&clip_id, &identity).await {
                    debug!(clip_id = %clip_id, "Status stream not opened: {}", e);
                }
            }
            Some(SnapshotOutcome::Ready(Outcome::Succeeded)) => {
                metrics::record_terminal(Outcome::Succeeded);
                logger.log_completion("already rendered");
            }
            Some(SnapshotOutcome::Ready(Outcome::Failed)) => {
                metrics::record_terminal(Outcome::Failed);
                logger.log_error("render already failed");
                self.shared
                    .notify(&self.lifetime, Notification::error("Error", FAILED_MESSAGE));
            }
            Some(SnapshotOutcome::Ignored) | None => {}
        }

        Ok(())
    }

    /// Open the status stream for `clip_id`, replacing any stream this
    /// controller already has.
    ///
    /// A viewer without identity moves the view to
    /// `Error(AuthenticationMissing)` and no connection is attempted.
    pub async fn open_stream(&self, clip_id: &ClipId, identity: &Identity) -> ControllerResult<()> {
        if self.is_disposed() {
            return Err(ControllerError::Disposed);
        }
        if clip_id.is_blank() {
            return Err(ControllerError::InvalidClipId);
        }

        let mut active = self.active.lock().await;
        if let Some(stale) = active.take() {
            stale.shutdown().await;
        }

        let logger = ClipLogger::new(clip_id, "status_stream");
        let token = match identity.resolve().map(|principal| self.sealer.seal(principal)) {
            Some(Ok(token)) => token,
            Some(Err(e)) => {
                logger.log_error(&format!("failed to seal viewer identity: {}", e));
                return self.reject_unauthenticated();
            }
            None => {
                logger.log_error(AUTH_MISSING_MESSAGE);
                return self.reject_unauthenticated();
            }
        };

        let cancel = self.lifetime.child_token();
        match self
            .shared
            .mutate(&cancel, |view| machine::begin_stream(view, clip_id))
        {
            None => return Err(ControllerError::Disposed),
            Some(false) => {
                debug!(clip_id = %clip_id, "View already settled, not opening stream");
                return Ok(());
            }
            Some(true) => {}
        }

        let span = logger.create_span();
        let driver = StreamDriver {
            shared: Arc::clone(&self.shared),
            clip_id: clip_id.clone(),
            token,
            cancel: cancel.clone(),
            logger,
        };
        let handle = tokio::spawn(driver.run().instrument(span));
        *active = Some(ActiveStream { cancel, handle });

        Ok(())
    }

    fn reject_unauthenticated(&self) -> ControllerResult<()> {
        let failed = self.shared.mutate(&self.lifetime, |view| {
            machine::fail(view, ErrorKind::AuthenticationMissing, AUTH_MISSING_MESSAGE)
        });
        if failed == Some(true) {
            self.shared.notify(
                &self.lifetime,
                Notification::error("Authentication Error", AUTH_MISSING_MESSAGE),
            );
        }
        Err(ControllerError::AuthenticationMissing)
    }
}

impl<Q, S, N> ClipStatusController<Q, S, N> {
    /// Current view.
    pub fn view(&self) -> ClipView {
        self.shared.view.borrow().clone()
    }

    /// Receiver that observes every view change.
    pub fn subscribe(&self) -> watch::Receiver<ClipView> {
        self.shared.view.subscribe()
    }

    /// Wait until the view reaches a terminal state or the controller is disposed.
    pub async fn settled(&self) -> ClipView {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(ClipView::is_settled).await.map(|view| view.clone());
        settled.unwrap_or_else(|_| self.view())
    }

    pub fn is_disposed(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Stop observing the clip. Idempotent.
    ///
    /// Closes the stream, cancels any pending reconnect and freezes the view.
    pub fn dispose(&self) {
        let mut first = false;
        self.shared.view.send_if_modified(|view| {
            if self.lifetime.is_cancelled() {
                return false;
            }
            self.lifetime.cancel();
            view.disposed = true;
            first = true;
            true
        });
        if !first {
            return;
        }

        // A concurrent open_stream holds the lock; its driver's token is a
        // child of `lifetime` and is already cancelled.
        if let Ok(mut guard) = self.active.try_lock() {
            if let Some(active) = guard.take() {
                active.cancel.cancel();
                active.handle.abort();
            }
        }
        debug!("Clip status controller disposed");
    }
}

impl<N: NotificationSink + 'static> ClipStatusController<ClipApiClient, ClipApiClient, N> {
    /// Build a controller that uses one API client for snapshot and stream,
    /// sealing identities with the client's configured secret.
    pub fn with_client(client: Arc<ClipApiClient>, notifier: Arc<N>, config: ControllerConfig) -> Self {
        let sealer = IdentitySealer::from_secret(client.config().auth_secret.as_deref());
        Self::new(Arc::clone(&client), client, notifier, sealer, config)
    }
}

impl<Q, S, N> Drop for ClipStatusController<Q, S, N> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// How one connection ended.
enum StreamEnd {
    /// Terminal status, settled view or cancellation: stop for good.
    Finished,
    /// Transport error or end of stream without a terminal status.
    Dropped(String),
}

/// Task that owns the status stream of one controller.
struct StreamDriver<S, N> {
    shared: Arc<Shared<S, N>>,
    clip_id: ClipId,
    token: String,
    cancel: CancellationToken,
    logger: ClipLogger,
}

impl<S: ClipEventSource, N: NotificationSink> StreamDriver<S, N> {
    async fn run(self) {
        // Reconnects since the last delivered event.
        let mut attempt: u32 = 0;
        let mut last_event_id: Option<String> = None;

        loop {
            let opened = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                opened = self.shared.source.subscribe(&self.clip_id, &self.token, last_event_id.as_deref()) => opened,
            };

            let reason = match opened {
                Ok(stream) => {
                    metrics::record_stream_opened();
                    self.shared.mutate(&self.cancel, machine::resume_stream);
                    match self.consume(stream, &mut attempt, &mut last_event_id).await {
                        StreamEnd::Finished => return,
                        StreamEnd::Dropped(reason) => reason,
                    }
                }
                Err(e) => e.to_string(),
            };

            let Some(delay) = self.schedule_reconnect(attempt + 1, &reason) else {
                return;
            };
            attempt += 1;

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Apply events until the connection ends. The stream is dropped on return.
    async fn consume(
        &self,
        mut stream: ClipEventStream,
        attempt: &mut u32,
        last_event_id: &mut Option<String>,
    ) -> StreamEnd {
        let progress_policy = self.shared.config.progress;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StreamEnd::Finished,
                next = stream.next() => next,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => return StreamEnd::Dropped(e.to_string()),
                None => return StreamEnd::Dropped("stream ended before a terminal status".to_string()),
            };
            *attempt = 0;
            if let Some(id) = &event.event_id {
                *last_event_id = Some(id.clone()).filter(|id| !id.is_empty());
            }

            let outcome = self
                .shared
                .mutate(&self.cancel, |view| machine::apply_event(view, &event, progress_policy));

            match outcome {
                Some(EventOutcome::Progress) => {
                    metrics::record_event();
                    self.logger.log_progress(event.percentage, &event.message);
                }
                Some(EventOutcome::Succeeded) => {
                    metrics::record_event();
                    metrics::record_terminal(Outcome::Succeeded);
                    self.logger.log_completion("render succeeded");
                    return StreamEnd::Finished;
                }
                Some(EventOutcome::Failed { message }) => {
                    metrics::record_event();
                    metrics::record_terminal(Outcome::Failed);
                    self.logger.log_error(&message);
                    self.shared
                        .notify(&self.cancel, Notification::error("Error", message));
                    return StreamEnd::Finished;
                }
                Some(EventOutcome::Ignored) | None => return StreamEnd::Finished,
            }
        }
    }

    /// Decide what follows a dropped connection.
    ///
    /// Returns the delay before reconnect number `attempt`, or `None` when the
    /// driver should stop.
    fn schedule_reconnect(&self, attempt: u32, reason: &str) -> Option<Duration> {
        let processing = self.shared.view.borrow().is_processing();
        if !processing {
            debug!(clip_id = %self.clip_id, "Clip no longer processing, not reconnecting");
            return None;
        }

        let policy = &self.shared.config.reconnect;
        if !policy.allows(attempt) {
            self.logger.log_error(&format!(
                "giving up after {} reconnect attempts: {}",
                attempt - 1,
                reason
            ));
            let failed = self.shared.mutate(&self.cancel, |view| {
                machine::fail(view, ErrorKind::StreamExhausted, EXHAUSTED_MESSAGE)
            });
            if failed == Some(true) {
                self.shared
                    .notify(&self.cancel, Notification::error("Connection Error", EXHAUSTED_MESSAGE));
            }
            return None;
        }

        let delay = policy.delay_for(attempt);
        let scheduled = self
            .shared
            .mutate(&self.cancel, |view| machine::begin_reconnect(view, attempt));
        if scheduled != Some(true) {
            return None;
        }

        metrics::record_reconnect();
        self.logger
            .log_reconnect(attempt, delay.as_millis() as u64, reason);
        self.shared
            .notify(&self.cancel, Notification::warning("Connection Error", RECONNECTING_MESSAGE));
        Some(delay)
    }
}
