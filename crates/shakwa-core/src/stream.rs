// ── Store subscriptions ──

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::NotificationSnapshot;

/// A subscription to the notification store.
///
/// Provides point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct NotificationStream {
    current: Arc<NotificationSnapshot>,
    receiver: watch::Receiver<Arc<NotificationSnapshot>>,
}

impl NotificationStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<NotificationSnapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<NotificationSnapshot> {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<NotificationSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<NotificationSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream`. Yields the current snapshot first, then one
    /// item per change.
    pub fn into_stream(self) -> NotificationWatchStream {
        NotificationWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct NotificationWatchStream {
    inner: WatchStream<Arc<NotificationSnapshot>>,
}

impl Stream for NotificationWatchStream {
    type Item = Arc<NotificationSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
