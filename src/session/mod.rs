//! QR session connector for the personal channel.
//!
//! One connector per user session (not per conversation). It owns the
//! handshake phase and the QR payload, and is the only writer of either.
//! The guard against a second concurrent handshake is the phase itself:
//! `begin` only transitions out of `Idle`, so at most one stream is ever
//! live. There is no shared "is a stream open" flag outside the connector.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::providers::personal::PersonalClient;

pub mod stream;

use stream::{spawn_login_listener, LoginEvent, StreamSignal};

/// Handshake phase. `error` is not a phase: transient provider errors are
/// annotations on the payload while the stream stays live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No handshake in progress.
    #[default]
    Idle,
    /// Stream open; QR not yet scanned or scan pending confirmation.
    Waiting,
    /// Terminal success.
    Connected,
}

/// QR payload shown while the handshake runs. Mutated only by the
/// connector; cleared on close.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QrPayload {
    /// Displayable `data:image/png;base64,...` URI, once a QR arrived.
    pub image_data_uri: Option<String>,
    /// Latest status hint from the provider.
    pub status_code: Option<String>,
    /// Latest error hint; does not end the handshake.
    pub error_message: Option<String>,
}

/// The QR handshake state machine.
#[derive(Debug, Default)]
pub struct SessionConnector {
    phase: SessionPhase,
    payload: QrPayload,
    needs_session_refresh: bool,
}

impl SessionConnector {
    /// Fresh connector in `Idle` with an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current handshake phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current QR payload.
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }

    /// Start a handshake. Only valid from `Idle`: clears any prior payload
    /// and moves to `Waiting`. Returns `false` without side effects when a
    /// handshake is already live.
    pub fn begin(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Waiting;
        self.payload = QrPayload::default();
        self.needs_session_refresh = false;
        true
    }

    /// Apply one stream event. Events arriving while `Idle` belong to a
    /// stream that was closed underneath them and are discarded.
    pub fn apply(&mut self, event: LoginEvent) {
        if self.phase == SessionPhase::Idle {
            return;
        }
        match event {
            LoginEvent::Qr { image } => {
                self.payload.image_data_uri = Some(format!("data:image/png;base64,{image}"));
            }
            LoginEvent::Status { code } => {
                self.payload.status_code = Some(code);
            }
            LoginEvent::Success => {
                self.phase = SessionPhase::Connected;
                self.needs_session_refresh = true;
            }
            LoginEvent::Error { message } => {
                // The user may still complete the scan.
                self.payload.error_message = Some(message);
            }
        }
    }

    /// Record that the stream never opened: keep the failure hint visible,
    /// release the guard so the user can retry.
    pub fn fail_stream(&mut self, message: String) {
        if self.phase == SessionPhase::Waiting {
            self.payload.error_message = Some(message);
            self.phase = SessionPhase::Idle;
        }
    }

    /// Tear down local handshake state from any phase. The provider session,
    /// if one was established, is not revoked.
    pub fn close(&mut self) {
        self.phase = SessionPhase::Idle;
        self.payload = QrPayload::default();
        self.needs_session_refresh = false;
    }

    /// Consume the "refresh the session list" flag set by a success event.
    pub fn take_session_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_session_refresh)
    }
}

/// Buffer size for stream signals between reader and driver.
const SIGNAL_BUFFER: usize = 16;

/// Drive one QR handshake: open the stream, feed events into the connector,
/// and refresh the session list once the handshake succeeds.
///
/// Returns the connector's phase when the stream ends. A second call while a
/// handshake is live returns immediately (the `begin` guard rejects it). No
/// timeout is enforced: `Waiting` persists until close or a terminal event.
pub async fn run_login(
    connector: &Mutex<SessionConnector>,
    client: Arc<PersonalClient>,
) -> SessionPhase {
    {
        let mut guard = connector.lock().await;
        if !guard.begin() {
            info!("login handshake already in progress, ignoring open request");
            return guard.phase();
        }
    }

    let (signal_tx, mut signal_rx) = mpsc::channel(SIGNAL_BUFFER);
    let listener = spawn_login_listener(Arc::clone(&client), signal_tx);

    while let Some(signal) = signal_rx.recv().await {
        let refresh_sessions = {
            let mut guard = connector.lock().await;
            match signal {
                StreamSignal::Event(event) => guard.apply(event),
                StreamSignal::OpenFailed(message) => {
                    guard.fail_stream(message);
                    break;
                }
            }
            if guard.phase() == SessionPhase::Idle {
                // Closed underneath us: stop consuming this stream.
                break;
            }
            guard.take_session_refresh()
        };

        if refresh_sessions {
            match client.sessions().await {
                Ok(sessions) => {
                    info!(count = sessions.len(), "session list refreshed after link")
                }
                Err(e) => warn!(error = %e, "session list refresh failed after link"),
            }
            break;
        }
    }

    listener.abort();
    connector.lock().await.phase()
}
