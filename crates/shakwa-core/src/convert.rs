// Wire record → domain type.

use shakwa_api::NotificationRecord;

use crate::model::{Notification, NotificationId};

impl From<NotificationRecord> for Notification {
    fn from(r: NotificationRecord) -> Self {
        Self {
            id: NotificationId::new(r.id.to_string()),
            title_ar: r.title_ar,
            title_en: r.title_en,
            message_ar: r.message_ar,
            message_en: r.message_en,
            is_read: r.is_read,
            action_url: r.action_url.filter(|u| !u.trim().is_empty()),
            created_at: r.created_at,
        }
    }
}
