// ── Core error types ──
//
// User-facing errors from shakwa-core. Callers never see HTTP status
// codes or JSON parse failures directly; `From<shakwa_api::Error>`
// translates transport errors into these variants.
//
// Store operations swallow errors (they log and keep state). `CoreError`
// surfaces only from construction and `NotificationCenter::oneshot`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Session expired -- sign in again")]
    SessionExpired,

    #[error("No session credential available")]
    MissingCredential,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Notification not found: {identifier}")]
    NotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<shakwa_api::Error> for CoreError {
    fn from(err: shakwa_api::Error) -> Self {
        match err {
            shakwa_api::Error::SessionExpired => CoreError::SessionExpired,
            shakwa_api::Error::MissingCredential => CoreError::MissingCredential,
            shakwa_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            shakwa_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            shakwa_api::Error::InvalidEndpoint(reason) => CoreError::Config {
                message: format!("Invalid endpoint: {reason}"),
            },
            shakwa_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            shakwa_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                identifier: message,
            },
            shakwa_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            shakwa_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            shakwa_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
