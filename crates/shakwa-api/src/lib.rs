// shakwa-api: Async client for the complaints platform notification API and push endpoint

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;
pub mod websocket;

pub use auth::Session;
pub use client::NotificationClient;
pub use error::Error;
pub use models::{NotificationPage, NotificationRecord, RecordId};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{
    ConnectionState, FrameHandler, PushConfig, PushConnection, PushFrame, PushTransport,
    TungsteniteTransport,
};
