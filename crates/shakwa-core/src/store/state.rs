// ── Store state and its mutations ──
//
// Pure state transitions applied under `watch::Sender::send_modify`, so
// concurrent relative changes (push +1, mark-read −1) compose instead of
// overwriting each other.

use crate::model::{Notification, NotificationId};

/// Immutable view of the store published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSnapshot {
    /// Held notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Server aggregate adjusted by local deltas. Never negative.
    pub unread_count: u64,
    /// Total on the server, when the last fetch reported it.
    pub total: Option<u64>,
    /// `true` until the first fetch resolves.
    pub loading: bool,
}

impl Default for NotificationSnapshot {
    fn default() -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            total: None,
            loading: true,
        }
    }
}

impl NotificationSnapshot {
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| &n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Unread entries among those held (may differ from `unread_count`
    /// when the server has more than one page).
    pub fn held_unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    pub(crate) fn replace(
        &mut self,
        notifications: Vec<Notification>,
        unread_count: u64,
        total: Option<u64>,
    ) {
        self.notifications = notifications;
        self.unread_count = unread_count;
        self.total = total;
    }

    pub(crate) fn prepend_unread(&mut self, mut notification: Notification) {
        notification.is_read = false;
        self.notifications.insert(0, notification);
        self.unread_count += 1;
        if let Some(total) = self.total.as_mut() {
            *total += 1;
        }
    }

    /// Flip the entry to read. Returns `true` if an unread entry was flipped.
    pub(crate) fn mark_read(&mut self, id: &NotificationId) -> bool {
        let Some(entry) = self.notifications.iter_mut().find(|n| &n.id == id) else {
            return false;
        };
        if entry.is_read {
            return false;
        }
        entry.is_read = true;
        self.unread_count = self.unread_count.saturating_sub(1);
        true
    }

    pub(crate) fn mark_all_read(&mut self) {
        for n in &mut self.notifications {
            n.is_read = true;
        }
        self.unread_count = 0;
    }

    /// Remove the entry. Unread removals decrement the aggregate.
    pub(crate) fn remove(&mut self, id: &NotificationId) -> Option<Notification> {
        let pos = self.notifications.iter().position(|n| &n.id == id)?;
        let removed = self.notifications.remove(pos);
        if !removed.is_read {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        if let Some(total) = self.total.as_mut() {
            *total = total.saturating_sub(1);
        }
        Some(removed)
    }
}
