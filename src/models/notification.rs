use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewNotification as DomainNewNotification, Notification as DomainNotification,
    NotificationType,
};
use crate::domain::types::{NotificationId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_type: Option<String>,
    pub related_id: Option<i32>,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification<'a> {
    pub user_id: i32,
    pub title: &'a str,
    pub message: &'a str,
    pub notification_type: &'a str,
    pub related_type: Option<&'a str>,
    pub related_id: Option<i32>,
}

impl TryFrom<Notification> for DomainNotification {
    type Error = TypeConstraintError;

    fn try_from(notification: Notification) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::try_from(notification.id)?,
            user_id: UserId::try_from(notification.user_id)?,
            title: notification.title,
            message: notification.message,
            notification_type: NotificationType::try_from(notification.notification_type)?,
            related_type: notification.related_type,
            related_id: notification.related_id,
            is_read: notification.is_read,
            read_at: notification.read_at,
            created_at: notification.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewNotification> for NewNotification<'a> {
    fn from(notification: &'a DomainNewNotification) -> Self {
        Self {
            user_id: notification.user_id.get(),
            title: notification.title.as_str(),
            message: notification.message.as_str(),
            notification_type: notification.notification_type.as_str(),
            related_type: notification.related_type.as_deref(),
            related_id: notification.related_id,
        }
    }
}
