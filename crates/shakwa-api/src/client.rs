// Notification REST client
//
// Wraps `reqwest::Client` with bearer authentication read from the shared
// `Session`, API-prefixed URL construction, and error-body parsing.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Session;
use crate::error::Error;
use crate::models::{NotificationPage, UnreadCount};
use crate::transport::TransportConfig;

/// Error response shape: `{"detail": "...", "code": "..."}` or `{"message": ...}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default, alias = "message")]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    code: Option<String>,
}

/// Async client for the notification endpoints of the platform REST API.
///
/// Every request carries `Authorization: Bearer <token>` taken from the
/// [`Session`] at send time. A session without a credential fails fast
/// with [`Error::MissingCredential`] instead of hitting the server.
pub struct NotificationClient {
    http: reqwest::Client,
    api_base: Url,
    session: Session,
}

impl NotificationClient {
    /// Build a client from the application origin and the API path prefix.
    ///
    /// `origin` is e.g. `https://complaints.example.gov`, `api_path` is
    /// e.g. `/api`; requests go to `{origin}{api_path}/notifications...`.
    pub fn new(
        origin: &Url,
        api_path: &str,
        session: Session,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, origin, api_path, session)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        origin: &Url,
        api_path: &str,
        session: Session,
    ) -> Result<Self, Error> {
        let api_base = Self::normalize_api_base(origin, api_path)?;
        Ok(Self {
            http,
            api_base,
            session,
        })
    }

    /// Join origin and API prefix into a base URL that always ends in `/`.
    fn normalize_api_base(origin: &Url, api_path: &str) -> Result<Url, Error> {
        let prefix = api_path.trim_matches('/');
        let base = origin.as_str().trim_end_matches('/');
        let full = if prefix.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{prefix}/")
        };
        Ok(Url::parse(&full)?)
    }

    /// The resolved API base URL.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch one page of notifications, newest first.
    ///
    /// `GET {api}/notifications?skip={skip}&limit={limit}`
    pub async fn list_notifications(
        &self,
        skip: u32,
        limit: u32,
    ) -> Result<NotificationPage, Error> {
        let url = self.url(&["notifications"])?;
        debug!(skip, limit, "fetching notifications");
        let params = [("skip", skip.to_string()), ("limit", limit.to_string())];
        let resp = self
            .authorized(self.http.get(url).query(&params))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Fetch only the unread aggregate.
    ///
    /// `GET {api}/notifications/unread-count`
    pub async fn unread_count(&self) -> Result<u64, Error> {
        let url = self.url(&["notifications", "unread-count"])?;
        debug!("fetching unread count");
        let resp = self.authorized(self.http.get(url))?.send().await?;
        let count: UnreadCount = self.handle_response(resp).await?;
        Ok(count.unread_count)
    }

    /// Mark a single notification as read. Idempotent on the server.
    ///
    /// `PATCH {api}/notifications/{id}/read`
    pub async fn mark_read(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["notifications", id, "read"])?;
        debug!(id, "marking notification read");
        let resp = self.authorized(self.http.patch(url))?.send().await?;
        self.handle_empty(resp).await
    }

    /// Mark every notification of the signed-in user as read.
    ///
    /// `POST {api}/notifications/mark-all-read` (no body)
    pub async fn mark_all_read(&self) -> Result<(), Error> {
        let url = self.url(&["notifications", "mark-all-read"])?;
        debug!("marking all notifications read");
        let resp = self.authorized(self.http.post(url))?.send().await?;
        self.handle_empty(resp).await
    }

    /// Delete a single notification.
    ///
    /// `DELETE {api}/notifications/{id}`
    pub async fn delete_notification(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&["notifications", id])?;
        debug!(id, "deleting notification");
        let resp = self.authorized(self.http.delete(url))?.send().await?;
        self.handle_empty(resp).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Append path segments to the API base. Each segment is percent-encoded,
    /// so ids containing `/` or spaces stay a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(format!("{} cannot be a base", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer header from the current session credential.
    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.session.token().ok_or(Error::MissingCredential)?;
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::MissingCredential)?;
        value.set_sensitive(true);
        Ok(builder.header(AUTHORIZATION, value))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }

        let raw = resp.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => Error::Api {
                status: status.as_u16(),
                message: match err.detail {
                    Some(serde_json::Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => status.to_string(),
                },
                code: err.code,
            },
            Err(_) => Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            },
        }
    }
}
