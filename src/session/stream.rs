//! Login stream plumbing: event vocabulary, SSE-style framing, and the
//! background reader task.
//!
//! The bridge streams JSON events as `data: {...}` lines with a `type`
//! discriminator. Unknown event types are skipped; the stream keeps going.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::providers::personal::PersonalClient;

/// One event on the QR login stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    /// A fresh QR image (base64 bytes, no data-URI prefix).
    Qr {
        /// Base64-encoded image bytes.
        image: String,
    },
    /// A short human-readable status hint.
    Status {
        /// Status code string, e.g. `WAITING_SCAN`.
        code: String,
    },
    /// The companion device confirmed the scan; the handshake succeeded.
    Success,
    /// A transient provider error; the handshake is still live.
    Error {
        /// Error message to surface as a hint.
        message: String,
    },
}

/// Signal delivered by the stream reader to the connector driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// A parsed stream event.
    Event(LoginEvent),
    /// The stream could not be opened at all (network-level failure before
    /// any event arrived). The connector must release its guard.
    OpenFailed(String),
}

/// Parse one stream event from its JSON payload.
///
/// Unknown `type` values and malformed payloads return `None` and are
/// skipped by the reader.
pub fn parse_event(payload: &str) -> Option<LoginEvent> {
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    match value.get("type").and_then(|t| t.as_str())? {
        "qr" => value
            .pointer("/data/image")
            .and_then(|v| v.as_str())
            .map(|image| LoginEvent::Qr {
                image: image.to_owned(),
            }),
        "status" => value
            .pointer("/data/code")
            .and_then(|v| v.as_str())
            .map(|code| LoginEvent::Status {
                code: code.to_owned(),
            }),
        "success" => Some(LoginEvent::Success),
        "error" => Some(LoginEvent::Error {
            message: value
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown stream error")
                .to_owned(),
        }),
        _ => None,
    }
}

/// Reassembles `data:` payloads from arbitrarily chunked stream bytes.
#[derive(Debug, Default)]
pub(crate) struct SseLineBuffer {
    pending: String,
}

impl SseLineBuffer {
    /// Push one chunk; returns the complete `data:` payloads it finished.
    pub(crate) fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                let payload = payload.trim();
                if !payload.is_empty() {
                    payloads.push(payload.to_owned());
                }
            }
        }
        payloads
    }
}

/// Spawn the login stream reader.
///
/// Opens exactly one stream and forwards each parsed event to `signal_tx`.
/// The task ends on `Success`, on a read error (surfaced as an `Error`
/// event), when the receiver is dropped, or when the stream closes. A
/// failure to open the stream at all is reported as
/// [`StreamSignal::OpenFailed`].
pub fn spawn_login_listener(
    client: Arc<PersonalClient>,
    signal_tx: mpsc::Sender<StreamSignal>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        debug!(url = %client.base_url(), "opening login stream");
        let resp = match client.open_login_stream().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "login stream failed to open");
                let _ = signal_tx
                    .send(StreamSignal::OpenFailed(format!(
                        "login stream failed to open: {e}"
                    )))
                    .await;
                return;
            }
        };

        let bytes = resp.bytes_stream();
        tokio::pin!(bytes);
        let mut lines = SseLineBuffer::default();
        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "login stream read failed");
                    let _ = signal_tx
                        .send(StreamSignal::Event(LoginEvent::Error {
                            message: format!("stream read failed: {e}"),
                        }))
                        .await;
                    return;
                }
            };
            let text = String::from_utf8_lossy(&chunk);
            for payload in lines.push(&text) {
                let Some(event) = parse_event(&payload) else {
                    debug!(payload, "skipping unknown stream event");
                    continue;
                };
                let terminal = matches!(event, LoginEvent::Success);
                if signal_tx.send(StreamSignal::Event(event)).await.is_err() {
                    // Receiver dropped: the connector was closed.
                    return;
                }
                if terminal {
                    return;
                }
            }
        }
        debug!("login stream closed by provider");
    })
}
