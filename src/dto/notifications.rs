use serde::Serialize;

use crate::domain::notification::Notification;
use crate::pagination::Paginated;

#[derive(Debug)]
pub struct NotificationsPageData {
    pub notifications: Paginated<Notification>,
    pub unread: usize,
    pub unread_only: bool,
}

/// Body of `/api/v1/notifications/unread-count`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: usize,
}
