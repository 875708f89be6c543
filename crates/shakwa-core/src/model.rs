// ── Notification domain type ──
//
// Canonical notification as held by the store. Built from wire records
// (see `convert`), rendered per locale by consumers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Opaque notification identifier, stable across fetch and push.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A user-facing notification with bilingual text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title_ar: String,
    pub title_en: String,
    pub message_ar: String,
    pub message_en: String,
    pub is_read: bool,
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Title in `locale`, falling back to the other language when empty.
    pub fn title(&self, locale: Locale) -> &str {
        pick(locale, &self.title_ar, &self.title_en)
    }

    /// Message in `locale`, falling back to the other language when empty.
    pub fn message(&self, locale: Locale) -> &str {
        pick(locale, &self.message_ar, &self.message_en)
    }

    /// Following the deep link marks the entry read only when there is a
    /// link to follow and the entry is still unread.
    pub fn marks_read_on_open(&self) -> bool {
        self.action_url.is_some() && !self.is_read
    }

    pub fn age(&self, now: DateTime<Utc>, locale: Locale) -> String {
        relative_age(self.created_at, now, locale)
    }
}

fn pick<'a>(locale: Locale, ar: &'a str, en: &'a str) -> &'a str {
    let field = |l: Locale| match l {
        Locale::Ar => ar,
        Locale::En => en,
    };
    let primary = field(locale);
    if primary.trim().is_empty() {
        field(locale.fallback())
    } else {
        primary
    }
}

/// Short relative timestamp: `just now`, `5m ago`, `3h ago`, `2d ago`.
///
/// Timestamps in the future (clock skew) render as `just now`.
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let secs = (now - created_at).num_seconds().max(0);
    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    match locale {
        Locale::En => match (minutes, hours, days) {
            (0, _, _) => "just now".to_string(),
            (m, 0, _) => format!("{m}m ago"),
            (_, h, 0) => format!("{h}h ago"),
            (_, _, d) => format!("{d}d ago"),
        },
        Locale::Ar => match (minutes, hours, days) {
            (0, _, _) => "الآن".to_string(),
            (m, 0, _) => format!("منذ {m} دقيقة"),
            (_, h, 0) => format!("منذ {h} ساعة"),
            (_, _, d) => format!("منذ {d} يوم"),
        },
    }
}
