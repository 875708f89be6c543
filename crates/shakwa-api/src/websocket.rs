//! Push connection with automatic reconnect.
//!
//! Opens the platform's notification WebSocket, authenticates with the
//! session credential as a `token` query parameter, and hands every parsed
//! frame to a single registered [`FrameHandler`]. After any drop the
//! connection is rebuilt after a fixed delay (3 s by default) until the
//! owning [`PushConnection`] is torn down.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shakwa_api::{PushConfig, PushConnection, Session, TungsteniteTransport};
//! use url::Url;
//!
//! let origin = Url::parse("https://complaints.example.gov")?;
//! let handler = Arc::new(|frame: shakwa_api::PushFrame| println!("{}", frame.kind));
//!
//! let conn = PushConnection::spawn(
//!     PushConfig::new(origin),
//!     Session::with_token(token),
//!     TungsteniteTransport,
//!     handler,
//! );
//!
//! // ... later, when the consumer goes away:
//! conn.teardown().await;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::auth::Session;
use crate::error::Error;

/// Fixed delay between a drop and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Path of the push endpoint under the application origin.
pub const DEFAULT_PUSH_PATH: &str = "/ws/notifications";

/// Frame discriminator for a newly created notification.
pub const NEW_NOTIFICATION: &str = "new_notification";

// ── PushFrame ────────────────────────────────────────────────────────

/// A structured frame received from the push endpoint.
///
/// Every frame is an envelope `{ "type": "...", "data": { ... } }`.
/// The payload is kept as raw JSON; interpreting it is the consumer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl PushFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_new_notification(&self) -> bool {
        self.kind == NEW_NOTIFICATION
    }
}

/// Callback invoked once per parsed frame, in arrival order.
pub type FrameHandler = Arc<dyn Fn(PushFrame) + Send + Sync>;

// ── PushConfig ───────────────────────────────────────────────────────

/// Where and how to (re)connect.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Application origin, e.g. `https://complaints.example.gov`.
    /// Its scheme picks `wss` (https) or `ws` (http).
    pub origin: Url,

    /// Endpoint path under the origin. Default: `/ws/notifications`.
    pub path: String,

    /// Delay before reconnecting after a drop. Default: 3 s.
    pub reconnect_delay: Duration,
}

impl PushConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            path: DEFAULT_PUSH_PATH.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Derive the push endpoint for the given credential.
    ///
    /// Same host and port as the origin, secure scheme iff the origin is
    /// secure, credential appended as `?token=`.
    pub fn endpoint(&self, token: &SecretString) -> Result<Url, Error> {
        let scheme = match self.origin.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(Error::InvalidEndpoint(format!(
                    "unsupported origin scheme '{other}'"
                )));
            }
        };

        let mut url = self.origin.clone();
        url.set_scheme(scheme)
            .map_err(|()| Error::InvalidEndpoint(format!("cannot switch origin to {scheme}")))?;
        url.set_path(&self.path);
        url.set_fragment(None);
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("token", token.expose_secret());
        Ok(url)
    }
}

/// Render an endpoint for logs without its query string (which holds the credential).
pub fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    if shown.query().is_some() {
        shown.set_query(Some("token=redacted"));
    }
    shown.to_string()
}

// ── ConnectionState ──────────────────────────────────────────────────

/// Lifecycle of the push connection as observed by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

// ── Transport seam ───────────────────────────────────────────────────

/// Text frames from an open connection. The stream ends when the
/// connection closes; an `Err` item is a transport error (also terminal).
pub type FrameStream = BoxStream<'static, Result<String, Error>>;

/// Opens a push connection to a fully-formed endpoint.
///
/// [`Error::InvalidEndpoint`] marks a construction failure, which is not
/// retried. Any other error counts as a drop and is retried after the delay.
pub trait PushTransport: Send + Sync + 'static {
    fn open(&self, endpoint: Url) -> impl Future<Output = Result<FrameStream, Error>> + Send;
}

/// Production transport backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteTransport;

impl PushTransport for TungsteniteTransport {
    async fn open(&self, endpoint: Url) -> Result<FrameStream, Error> {
        let uri: tungstenite::http::Uri = endpoint.as_str().parse().map_err(
            |e: tungstenite::http::uri::InvalidUri| Error::InvalidEndpoint(e.to_string()),
        )?;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        let frames = ws_stream.filter_map(|message| async move {
            match message {
                Ok(tungstenite::Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(tungstenite::Message::Close(frame)) => {
                    if let Some(ref cf) = frame {
                        info!(code = %cf.code, reason = %cf.reason, "push close frame received");
                    } else {
                        info!("push close frame received (no payload)");
                    }
                    None
                }
                Ok(tungstenite::Message::Ping(_)) => {
                    // tungstenite answers pings on the next read
                    trace!("push ping");
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(Error::WebSocketConnect(e.to_string()))),
            }
        });

        Ok(frames.boxed())
    }
}

// ── PushConnection ───────────────────────────────────────────────────

/// Owner of the single live push connection and its reconnect schedule.
///
/// The socket and the pending reconnect delay live inside a background
/// task and are never reachable from outside. Dropping the handle or
/// calling [`teardown`](Self::teardown) stops the task for good.
pub struct PushConnection {
    cancel: CancellationToken,
    state: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl PushConnection {
    /// Spawn the connection task. The first attempt starts immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T: PushTransport>(
        config: PushConfig,
        session: Session,
        transport: T,
        handler: FrameHandler,
    ) -> Self {
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            push_loop(config, session, transport, handler, state_tx, task_cancel).await;
        });

        Self {
            cancel,
            state,
            task: Some(task),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Close the live connection, cancel any pending reconnect, and wait
    /// for the background task to finish.
    pub async fn teardown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "push task ended abnormally");
            }
        }
    }
}

impl Drop for PushConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// connect → read until drop → wait fixed delay → connect ...
async fn push_loop<T: PushTransport>(
    config: PushConfig,
    session: Session,
    transport: T,
    handler: FrameHandler,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    loop {
        let Some(token) = session.token() else {
            info!("no session credential, push connection idle");
            break;
        };

        let endpoint = match config.endpoint(&token) {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "cannot build push endpoint, not retrying");
                break;
            }
        };

        state.send_replace(ConnectionState::Connecting);
        info!(endpoint = %redact(&endpoint), "connecting to push endpoint");

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = transport.open(endpoint) => result,
        };

        match opened {
            Ok(frames) => {
                state.send_replace(ConnectionState::Connected);
                info!("push connection open");
                if read_frames(frames, &handler, &cancel).await == ReadEnd::Cancelled {
                    break;
                }
            }
            Err(Error::InvalidEndpoint(reason)) => {
                error!(reason = %reason, "push endpoint rejected before connecting, not retrying");
                break;
            }
            Err(e) => {
                warn!(error = %e, "push connection failed");
            }
        }

        state.send_replace(ConnectionState::Disconnected);
        let delay_ms = u64::try_from(config.reconnect_delay.as_millis()).unwrap_or(u64::MAX);
        info!(delay_ms, "push connection closed, reconnect scheduled");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(config.reconnect_delay) => {}
        }
    }

    // Subscribers already holding Disconnected only observe the sender closing.
    state.send_if_modified(|s| {
        std::mem::replace(s, ConnectionState::Disconnected) != ConnectionState::Disconnected
    });
    debug!("push loop exiting");
}

#[derive(Debug, PartialEq, Eq)]
enum ReadEnd {
    Closed,
    Cancelled,
}

/// Read frames until the connection drops or the owner cancels.
async fn read_frames(
    mut frames: FrameStream,
    handler: &FrameHandler,
    cancel: &CancellationToken,
) -> ReadEnd {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return ReadEnd::Cancelled,
            frame = frames.next() => match frame {
                Some(Ok(text)) => dispatch(&text, handler),
                Some(Err(e)) => {
                    warn!(error = %e, "push connection error");
                    return ReadEnd::Closed;
                }
                None => {
                    info!("push connection closed by peer");
                    return ReadEnd::Closed;
                }
            }
        }
    }
}

/// Parse a text frame and hand it to the handler. Malformed frames are dropped.
fn dispatch(text: &str, handler: &FrameHandler) {
    match PushFrame::parse(text) {
        Ok(frame) => handler(frame),
        Err(e) => debug!(error = %e, "dropping malformed push frame"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
