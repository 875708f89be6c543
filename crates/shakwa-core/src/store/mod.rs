// ── Notification store ──
//
// Holds the user's notification list and unread aggregate, reconciles
// pushed notifications with paginated REST history, and applies user
// mutations optimistically. Errors end here: every operation logs and
// keeps (or optimistically advances) local state.

mod state;

use std::sync::Arc;

use shakwa_api::websocket::{FrameHandler, PushFrame};
use shakwa_api::{NotificationClient, NotificationRecord};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

pub use state::NotificationSnapshot;

use crate::locale::Locale;
use crate::model::{Notification, NotificationId};
use crate::stream::NotificationStream;
use crate::toast::{Toast, ToastSink};

/// Reactive notification store.
///
/// Cheaply cloneable; clones share state. Snapshots are published through a
/// `watch` channel so UI consumers can re-render on change.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    client: NotificationClient,
    state: watch::Sender<Arc<NotificationSnapshot>>,
    locale: watch::Receiver<Locale>,
    toasts: Arc<dyn ToastSink>,
    page_size: u32,
}

impl NotificationStore {
    /// `locale` is read each time a toast is built, so switching language
    /// affects subsequent toasts only.
    pub fn new(
        client: NotificationClient,
        locale: watch::Receiver<Locale>,
        toasts: Arc<dyn ToastSink>,
        page_size: u32,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(NotificationSnapshot::default()));
        Self {
            inner: Arc::new(StoreInner {
                client,
                state,
                locale,
                toasts,
                page_size,
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<NotificationSnapshot> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> NotificationStream {
        NotificationStream::new(self.inner.state.subscribe())
    }

    pub fn unread_count(&self) -> u64 {
        self.inner.state.borrow().unread_count
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Wait until the first fetch has resolved (successfully or not).
    pub async fn loaded(&self) -> Arc<NotificationSnapshot> {
        let mut rx = self.inner.state.subscribe();
        let loaded = rx.wait_for(|s| !s.loading).await.map(|snap| snap.clone());
        loaded.unwrap_or_else(|_| self.snapshot())
    }

    // ── History ──────────────────────────────────────────────────────

    /// Load one page of history, replacing the held list and aggregate.
    ///
    /// Replaces rather than merges: pushes received since the last fetch
    /// are discarded unless the server returns them too. On failure the
    /// prior state is kept. `loading` is cleared either way.
    pub async fn fetch(&self, skip: u32, limit: u32) {
        match self.inner.client.list_notifications(skip, limit).await {
            Ok(page) => {
                let count = page.notifications.len();
                let notifications: Vec<Notification> = page
                    .notifications
                    .into_iter()
                    .map(Notification::from)
                    .collect();
                self.inner.state.send_modify(|s| {
                    let s = Arc::make_mut(s);
                    s.replace(notifications, page.unread_count, page.total);
                    s.loading = false;
                });
                debug!(count, unread = page.unread_count, skip, limit, "notifications fetched");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    transient = e.is_transient(),
                    skip,
                    limit,
                    "failed to fetch notifications"
                );
                self.inner.state.send_if_modified(|s| {
                    if s.loading {
                        Arc::make_mut(s).loading = false;
                        true
                    } else {
                        false
                    }
                });
            }
        }
    }

    /// Reload the first page with the configured page size.
    pub async fn refresh(&self) {
        self.fetch(0, self.inner.page_size).await;
    }

    // ── Push ─────────────────────────────────────────────────────────

    /// Handle one push frame. Only `new_notification` frames are acted on.
    ///
    /// The notification is prepended as unread, the aggregate grows by one,
    /// and exactly one toast is shown in the active locale.
    pub fn handle_push(&self, frame: PushFrame) {
        if !frame.is_new_notification() {
            trace!(kind = %frame.kind, "ignoring push frame");
            return;
        }

        let record: NotificationRecord = match serde_json::from_value(frame.data) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "dropping undecodable pushed notification");
                return;
            }
        };

        let notification = Notification::from(record);
        let locale = *self.inner.locale.borrow();
        let toast = Toast::for_notification(&notification, locale);
        debug!(id = %notification.id, %locale, "notification pushed");

        self.inner
            .state
            .send_modify(|s| Arc::make_mut(s).prepend_unread(notification));
        self.inner.toasts.show(toast);
    }

    /// Adapter for `PushConnection::spawn`.
    pub fn frame_handler(&self) -> FrameHandler {
        let store = self.clone();
        Arc::new(move |frame| store.handle_push(frame))
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Mark one notification read locally, then on the server.
    ///
    /// The aggregate only drops when a held unread entry was flipped.
    /// Server failures are logged and not rolled back.
    pub async fn mark_as_read(&self, id: &NotificationId) {
        let flipped = self.inner.state.send_if_modified(|s| {
            if s.get(id).is_some_and(|n| !n.is_read) {
                Arc::make_mut(s).mark_read(id)
            } else {
                false
            }
        });
        debug!(%id, flipped, "marking notification read");

        if let Err(e) = self.inner.client.mark_read(id.as_str()).await {
            warn!(
                error = %e,
                auth_expired = e.is_auth_expired(),
                %id,
                "failed to mark notification read"
            );
        }
    }

    /// Mark every held notification read and zero the aggregate.
    pub async fn mark_all_as_read(&self) {
        self.inner
            .state
            .send_modify(|s| Arc::make_mut(s).mark_all_read());
        debug!("marking all notifications read");

        if let Err(e) = self.inner.client.mark_all_read().await {
            warn!(
                error = %e,
                auth_expired = e.is_auth_expired(),
                "failed to mark all notifications read"
            );
        }
    }

    /// Remove a notification locally, then on the server.
    pub async fn delete_notification(&self, id: &NotificationId) {
        let removed = self.inner.state.send_if_modified(|s| {
            if s.get(id).is_some() {
                Arc::make_mut(s).remove(id).is_some()
            } else {
                false
            }
        });
        debug!(%id, removed, "deleting notification");

        if let Err(e) = self.inner.client.delete_notification(id.as_str()).await {
            warn!(
                error = %e,
                auth_expired = e.is_auth_expired(),
                %id,
                "failed to delete notification"
            );
        }
    }

    /// Follow a notification's deep link.
    ///
    /// Returns the held entry's `action_url`. When a link is present and the
    /// entry is unread it is marked read first.
    pub async fn open(&self, id: &NotificationId) -> Option<String> {
        let snapshot = self.snapshot();
        let entry = snapshot.get(id)?;
        let url = entry.action_url.clone()?;
        if entry.marks_read_on_open() {
            self.mark_as_read(id).await;
        }
        Some(url)
    }
}
