use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{NotificationId, UserId, string_enum};

string_enum!(
    NotificationType {
        EmailSent => "email_sent",
        EmailFailed => "email_failed",
        DueReminder => "due_reminder",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_type: Option<String>,
    pub related_id: Option<i32>,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_type: Option<String>,
    pub related_id: Option<i32>,
}

impl NewNotification {
    #[must_use]
    pub fn new(
        user_id: UserId,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            related_type: None,
            related_id: None,
        }
    }

    /// Links the notification to an entity such as `quotation` 7.
    #[must_use]
    pub fn related(mut self, related_type: impl Into<String>, related_id: i32) -> Self {
        self.related_type = Some(related_type.into());
        self.related_id = Some(related_id);
        self
    }
}
