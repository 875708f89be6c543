// ── Toast seam ──
//
// The store emits one toast per pushed notification. How it is shown is
// up to the consumer; the core only builds the content.

use std::time::Duration;

use tracing::info;

use crate::locale::{Locale, TextDirection};
use crate::model::Notification;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// A transient, non-blocking message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub direction: TextDirection,
    pub duration: Duration,
}

impl Toast {
    /// Toast for a newly delivered notification in the given locale.
    pub fn for_notification(notification: &Notification, locale: Locale) -> Self {
        Self {
            title: notification.title(locale).to_owned(),
            message: notification.message(locale).to_owned(),
            direction: locale.direction(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }
}

/// Fire-and-forget toast display. Must not block.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Logs toasts instead of displaying them. Useful headless.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingToastSink;

impl ToastSink for TracingToastSink {
    fn show(&self, toast: Toast) {
        info!(
            title = %toast.title,
            message = %toast.message,
            direction = %toast.direction,
            "notification toast"
        );
    }
}
