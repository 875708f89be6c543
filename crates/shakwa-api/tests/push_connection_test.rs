#![allow(clippy::unwrap_used)]
// Reconnect and frame-delivery behavior of `PushConnection`.
//
// Most tests drive a scripted in-memory transport on a paused clock so the
// fixed reconnect delay can be observed to the millisecond. The last test
// runs against a real local WebSocket server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use secrecy::SecretString;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use url::Url;

use shakwa_api::websocket::FrameStream;
use shakwa_api::{
    ConnectionState, Error, FrameHandler, PushConfig, PushConnection, PushFrame, PushTransport,
    Session, TungsteniteTransport,
};

// ── Scripted transport ──────────────────────────────────────────────

type ServerSide = mpsc::UnboundedSender<Result<String, Error>>;

#[derive(Clone, Default)]
struct ScriptedTransport {
    attempts: Arc<AtomicUsize>,
    endpoints: Arc<Mutex<Vec<Url>>>,
    servers: Arc<Mutex<Vec<Option<ServerSide>>>>,
    refuse_next: Arc<AtomicUsize>,
    reject_endpoint: bool,
}

impl ScriptedTransport {
    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Send a text frame on the most recent connection.
    fn send(&self, text: &str) {
        let servers = self.servers.lock().unwrap();
        let server = servers.last().and_then(Option::as_ref).unwrap();
        server.send(Ok(text.to_string())).unwrap();
    }

    /// Simulate the server dropping the most recent connection.
    fn close_latest(&self) {
        let mut servers = self.servers.lock().unwrap();
        if let Some(slot) = servers.last_mut() {
            slot.take();
        }
    }

    /// Simulate a transport error on the most recent connection.
    fn fail_latest(&self) {
        let servers = self.servers.lock().unwrap();
        let server = servers.last().and_then(Option::as_ref).unwrap();
        server
            .send(Err(Error::WebSocketConnect("connection reset".into())))
            .unwrap();
    }
}

impl PushTransport for ScriptedTransport {
    async fn open(&self, endpoint: Url) -> Result<FrameStream, Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().unwrap().push(endpoint);

        if self.reject_endpoint {
            return Err(Error::InvalidEndpoint("scripted rejection".into()));
        }
        if self
            .refuse_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::WebSocketConnect("connection refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.servers.lock().unwrap().push(Some(tx));
        let frames = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(frames.boxed())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

const DELAY: Duration = Duration::from_millis(3000);

fn config() -> PushConfig {
    PushConfig::new(Url::parse("https://complaints.example.gov").unwrap())
}

fn session() -> Session {
    Session::with_token(SecretString::from("trader-token".to_string()))
}

fn recording_handler() -> (FrameHandler, Arc<Mutex<Vec<PushFrame>>>) {
    let seen: Arc<Mutex<Vec<PushFrame>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let handler: FrameHandler = Arc::new(move |frame| sink.lock().unwrap().push(frame));
    (handler, seen)
}

async fn wait_for(state: &mut watch::Receiver<ConnectionState>, target: ConnectionState) {
    state.wait_for(|s| *s == target).await.unwrap();
}

// ── Connection establishment ────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_connects_with_token_in_query() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;

    assert!(conn.is_connected());
    let endpoints = transport.endpoints.lock().unwrap().clone();
    assert_eq!(
        endpoints[0].as_str(),
        "wss://complaints.example.gov/ws/notifications?token=trader-token"
    );
    conn.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_credential_stays_idle() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), Session::anonymous(), transport.clone(), handler);

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.attempts(), 0);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_construction_failure_is_not_retried() {
    let transport = ScriptedTransport {
        reject_endpoint: true,
        ..ScriptedTransport::default()
    };
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.attempts(), 1);
    assert!(!conn.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_origin_never_attempts() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let config = PushConfig::new(Url::parse("ftp://complaints.example.gov").unwrap());
    let _conn = PushConnection::spawn(config, session(), transport.clone(), handler);

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(transport.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_giving_up_closes_state_without_a_disconnect_event() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let config = PushConfig::new(Url::parse("ftp://complaints.example.gov").unwrap());
    let conn = PushConnection::spawn(config, session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    assert!(state.changed().await.is_err());
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}

// ── Frame delivery ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_frames_delivered_in_order_and_malformed_dropped() {
    let transport = ScriptedTransport::default();
    let (handler, seen) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;

    transport.send(r#"{"type":"new_notification","data":{"id":1}}"#);
    transport.send("{ definitely not json");
    transport.send(r#"{"type":"complaint_updated","data":{"id":19}}"#);
    transport.send(r#"{"type":"new_notification","data":{"id":2}}"#);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let seen = seen.lock().unwrap().clone();
    let kinds: Vec<&str> = seen.iter().map(|f| f.kind.as_str()).collect();
    assert_eq!(kinds, ["new_notification", "complaint_updated", "new_notification"]);
    assert_eq!(seen[0].data["id"], 1);
    assert_eq!(seen[2].data["id"], 2);
    assert!(conn.is_connected());
}

// ── Reconnection ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_reconnects_once_after_fixed_delay() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    assert_eq!(transport.attempts(), 1);

    transport.close_latest();
    wait_for(&mut state, ConnectionState::Disconnected).await;
    let closed_at = Instant::now();

    tokio::time::sleep_until(closed_at + DELAY - Duration::from_millis(1)).await;
    assert_eq!(transport.attempts(), 1, "no attempt before the delay elapses");
    assert!(!conn.is_connected());

    tokio::time::sleep_until(closed_at + DELAY + Duration::from_millis(1)).await;
    assert_eq!(transport.attempts(), 2, "exactly one attempt after the delay");
    wait_for(&mut state, ConnectionState::Connected).await;

    tokio::time::sleep(DELAY * 3).await;
    assert_eq!(transport.attempts(), 2, "no extra attempts while connected");
    conn.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stays_disconnected_for_whole_delay() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    transport.close_latest();
    wait_for(&mut state, ConnectionState::Disconnected).await;

    for _ in 0..29 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!conn.is_connected());
    }
    conn.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_triggers_reconnect() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;

    transport.fail_latest();
    wait_for(&mut state, ConnectionState::Disconnected).await;
    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;

    assert_eq!(transport.attempts(), 2);
    conn.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_refused_handshake_is_retried_after_delay() {
    let transport = ScriptedTransport {
        refuse_next: Arc::new(AtomicUsize::new(2)),
        ..ScriptedTransport::default()
    };
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(transport.attempts(), 1);

    tokio::time::sleep(DELAY).await;
    assert_eq!(transport.attempts(), 2);

    let mut state = conn.subscribe_state();
    tokio::time::sleep(DELAY).await;
    wait_for(&mut state, ConnectionState::Connected).await;
    assert_eq!(transport.attempts(), 3);
    conn.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_credential_cleared_while_waiting_goes_idle() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let session = session();
    let conn = PushConnection::spawn(config(), session.clone(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    session.clear();
    transport.close_latest();

    tokio::time::sleep(DELAY * 5).await;
    assert_eq!(transport.attempts(), 1);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

// ── Teardown ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_teardown_cancels_pending_reconnect() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    transport.close_latest();
    wait_for(&mut state, ConnectionState::Disconnected).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    conn.teardown().await;

    tokio::time::sleep(DELAY * 10).await;
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_closes_live_connection() {
    let transport = ScriptedTransport::default();
    let (handler, seen) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    conn.teardown().await;

    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
    tokio::time::sleep(DELAY * 10).await;
    assert_eq!(transport.attempts(), 1);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_reconnection() {
    let transport = ScriptedTransport::default();
    let (handler, _) = recording_handler();
    let conn = PushConnection::spawn(config(), session(), transport.clone(), handler);

    let mut state = conn.subscribe_state();
    wait_for(&mut state, ConnectionState::Connected).await;
    transport.close_latest();
    drop(conn);

    tokio::time::sleep(DELAY * 10).await;
    assert_eq!(transport.attempts(), 1);
}

// ── Real WebSocket server ───────────────────────────────────────────

#[tokio::test]
async fn test_tungstenite_transport_against_local_server() {
    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, uri_rx) = tokio::sync::oneshot::channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |req: &Request, resp: Response| {
            let _ = uri_tx.send(req.uri().to_string());
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();
        ws.send(Message::text(
            r#"{"type":"new_notification","data":{"id":77,"title_en":"Escalated"}}"#,
        ))
        .await
        .unwrap();
        // Hold the socket open until the client goes away.
        while ws.next().await.is_some() {}
    });

    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
    let handler: FrameHandler = Arc::new(move |frame| {
        let _ = frame_tx.send(frame);
    });
    let origin = Url::parse(&format!("http://{addr}")).unwrap();
    let conn = PushConnection::spawn(PushConfig::new(origin), session(), TungsteniteTransport, handler);

    let frame = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(frame.is_new_notification());
    assert_eq!(frame.data["id"], 77);

    let uri = uri_rx.await.unwrap();
    assert_eq!(uri, "/ws/notifications?token=trader-token");
    assert!(conn.is_connected());

    conn.teardown().await;
}
