// Wire types for the notification REST API and push payloads.
//
// Field names follow the server's snake_case JSON. Unknown fields are
// ignored so server-side additions never break deserialization.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Notification identifier as the server sends it.
///
/// Some endpoints serialize primary keys as integers, others as strings.
/// Both forms deserialize; [`Display`](fmt::Display) yields the path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A notification as returned by the list endpoint or pushed over the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: RecordId,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub message_ar: String,
    #[serde(default)]
    pub message_en: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One page of notification history plus the server's unread aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    #[serde(alias = "items")]
    pub notifications: Vec<NotificationRecord>,
    #[serde(default)]
    pub unread_count: u64,
    /// Total notifications on the server, when the endpoint reports it.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Response shape of the unread-count endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct UnreadCount {
    pub unread_count: u64,
}

/// Accept RFC 3339 timestamps and offset-less ISO timestamps (taken as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
