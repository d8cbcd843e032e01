//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; the decoder buffers partial lines and
//! emits a [`SseFrame`] every time a blank line dispatches an event.

use std::collections::VecDeque;
use std::fmt::Display;

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use enklipse_models::{ClipStatusEvent, CLIP_STATUS_EVENT};

use crate::error::ClientError;
use crate::service::ClipEventStream;

/// Event name used when a frame has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    /// Last `id:` seen on the stream when the frame was dispatched.
    pub id: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    skip_lf: bool,
    started: bool,
    event: Option<String>,
    data: Vec<String>,
    last_event_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let mut bytes = chunk;

        if !self.started && !bytes.is_empty() {
            self.started = true;
            if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
                bytes = rest;
            }
        }

        for &b in bytes {
            if self.skip_lf {
                self.skip_lf = false;
                if b == b'\n' {
                    continue;
                }
            }
            match b {
                b'\n' => self.end_line(&mut frames),
                b'\r' => {
                    self.skip_lf = true;
                    self.end_line(&mut frames);
                }
                _ => self.line.push(b),
            }
        }

        frames
    }

    fn end_line(&mut self, frames: &mut Vec<SseFrame>) {
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(frame) = self.dispatch() {
                frames.push(frame);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (&line[..], ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            // `retry:` hints are ignored; reconnect timing is the caller's policy.
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
            id: self.last_event_id.clone(),
        })
    }
}

struct DecodeState<B> {
    body: B,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
    done: bool,
}

/// Turn a raw response body into a stream of `clip-status` events.
///
/// Frames with any other event name are ignored; malformed payloads are
/// skipped with a warning. A body error yields one `Err` and ends the stream.
pub fn decode_status_events<B, T, E>(body: B) -> ClipEventStream
where
    B: Stream<Item = Result<T, E>> + Send + Unpin + 'static,
    T: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    let stream = futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                if frame.event != CLIP_STATUS_EVENT {
                    debug!(event = %frame.event, "Ignoring unrelated stream event");
                    continue;
                }
                match serde_json::from_str::<ClipStatusEvent>(&frame.data) {
                    Ok(mut event) => {
                        event.event_id = frame.id;
                        return Some((Ok(event), st));
                    }
                    Err(e) => {
                        warn!("Skipping malformed clip-status payload: {}", e);
                        continue;
                    }
                }
            }

            if st.done {
                return None;
            }

            match st.body.next().await {
                Some(Ok(chunk)) => {
                    let frames = st.decoder.feed(chunk.as_ref());
                    st.pending.extend(frames);
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(ClientError::stream(e.to_string())), st));
                }
                None => st.done = true,
            }
        }
    });

    Box::pin(stream)
}
