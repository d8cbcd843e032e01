//! Scripted snapshot and stream sources for controller tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio::time::Instant;

use enklipse_client::{ClientError, ClientResult, ClipEventSource, ClipEventStream, ClipQueryService, IdentitySealer};
use enklipse_models::{Clip, ClipId, ClipStatusEvent};
use enklipse_status::{ClipStatusController, ControllerConfig, RecordingSink};

pub const SECRET: &str = "test-secret";

pub type TestController = ClipStatusController<FakeQuery, ScriptedSource, RecordingSink>;

pub enum SnapshotReply {
    Clip(Clip),
    Api(StatusCode, &'static str),
    Network,
    Hang,
}

pub struct FakeQuery {
    reply: Mutex<Option<SnapshotReply>>,
    calls: AtomicUsize,
}

impl FakeQuery {
    pub fn new(reply: SnapshotReply) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClipQueryService for FakeQuery {
    async fn fetch_clip(&self, _clip_id: &ClipId) -> ClientResult<Clip> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().take();
        match reply {
            Some(SnapshotReply::Clip(clip)) => Ok(clip),
            Some(SnapshotReply::Api(status, message)) => Err(ClientError::api(status, message)),
            Some(SnapshotReply::Network) => Err(ClientError::stream("connection refused")),
            Some(SnapshotReply::Hang) => std::future::pending().await,
            None => panic!("snapshot requested more than once"),
        }
    }
}

/// One scripted connection of the status stream.
pub enum Connection {
    /// Yield the items, then end (`hang == false`) or stay open.
    Scripted {
        items: Vec<ClientResult<ClipStatusEvent>>,
        hang: bool,
    },
    /// Items pushed by the test while the connection is open.
    Live(mpsc::UnboundedReceiver<ClientResult<ClipStatusEvent>>),
}

impl Connection {
    pub fn events(events: Vec<ClipStatusEvent>) -> Self {
        Self::Scripted {
            items: events.into_iter().map(Ok).collect(),
            hang: true,
        }
    }

    pub fn then_error(events: Vec<ClipStatusEvent>, error: &str) -> Self {
        let mut items: Vec<_> = events.into_iter().map(Ok).collect();
        items.push(Err(ClientError::stream(error)));
        Self::Scripted { items, hang: false }
    }

    pub fn live() -> (Self, mpsc::UnboundedSender<ClientResult<ClipStatusEvent>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Live(rx), tx)
    }
}

/// Stream source that replays scripted connections and refuses once they run out.
#[derive(Default)]
pub struct ScriptedSource {
    connections: Mutex<VecDeque<Connection>>,
    opened: Mutex<Vec<Instant>>,
    tokens: Mutex<Vec<String>>,
    resumed_from: Mutex<Vec<Option<String>>>,
    closed: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            connections: Mutex::new(connections.into()),
            ..Default::default()
        }
    }

    /// Subscribe calls, including refused ones.
    pub fn opened(&self) -> Vec<Instant> {
        self.opened.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    /// `Last-Event-ID` passed to each subscribe call.
    pub fn resumed_from(&self) -> Vec<Option<String>> {
        self.resumed_from.lock().unwrap().clone()
    }

    /// Connections dropped by the consumer.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Connections currently held by the consumer.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Most connections ever held at once.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClipEventSource for ScriptedSource {
    async fn subscribe(
        &self,
        _clip_id: &ClipId,
        token: &str,
        last_event_id: Option<&str>,
    ) -> ClientResult<ClipEventStream> {
        self.opened.lock().unwrap().push(Instant::now());
        self.tokens.lock().unwrap().push(token.to_string());
        self.resumed_from.lock().unwrap().push(last_event_id.map(str::to_string));

        let next = self.connections.lock().unwrap().pop_front();
        let inner: ClipEventStream = match next {
            Some(Connection::Scripted { items, hang: true }) => Box::pin(stream::iter(items).chain(stream::pending())),
            Some(Connection::Scripted { items, hang: false }) => Box::pin(stream::iter(items)),
            Some(Connection::Live(rx)) => Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })),
            None => return Err(ClientError::stream("connection refused")),
        };

        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::pin(Tracked {
            inner,
            closed: Arc::clone(&self.closed),
            live: Arc::clone(&self.live),
        }))
    }
}

/// Counts when the consumer drops a connection.
struct Tracked {
    inner: ClipEventStream,
    closed: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl Stream for Tracked {
    type Item = ClientResult<ClipStatusEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub query: Arc<FakeQuery>,
    pub source: Arc<ScriptedSource>,
    pub sink: Arc<RecordingSink>,
    pub controller: TestController,
}

impl Harness {
    pub fn new(snapshot: SnapshotReply, connections: Vec<Connection>) -> Self {
        Self::with_config(snapshot, connections, ControllerConfig::default())
    }

    pub fn with_config(snapshot: SnapshotReply, connections: Vec<Connection>, config: ControllerConfig) -> Self {
        let query = Arc::new(FakeQuery::new(snapshot));
        let source = Arc::new(ScriptedSource::new(connections));
        let sink = Arc::new(RecordingSink::new());
        let controller = ClipStatusController::new(
            Arc::clone(&query),
            Arc::clone(&source),
            Arc::clone(&sink),
            IdentitySealer::new(SECRET),
            config,
        );
        Self {
            query,
            source,
            sink,
            controller,
        }
    }
}

pub fn processing_clip() -> Clip {
    Clip::processing("clip-1", "Volcanoes", "Lava flows downhill")
}

pub fn succeeded_clip(media_url: &str) -> Clip {
    let mut clip = processing_clip();
    clip.mark_succeeded(Some(media_url), None);
    clip
}

pub fn failed_clip() -> Clip {
    let mut clip = processing_clip();
    clip.mark_failed();
    clip
}

/// Poll `condition` until it holds, sleeping between checks.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition never held");
}
