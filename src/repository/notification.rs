//! Repository implementation for per-user notifications.

use chrono::NaiveDateTime;
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::notification::{NewNotification, Notification, NotificationType};
use crate::domain::types::{NotificationId, UserId};
use crate::models::notification::{
    NewNotification as DbNewNotification, Notification as DbNotification,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, NotificationListQuery, NotificationReader, NotificationWriter,
};

impl NotificationReader for DieselRepository {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<(usize, Vec<Notification>)> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: notifications::BoxedQuery<'_, Sqlite> = notifications::table
                .filter(notifications::user_id.eq(query.user_id.get()))
                .into_boxed();
            if query.unread_only {
                items = items.filter(notifications::is_read.eq(false));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered()
            .order(notifications::created_at.desc())
            .then_order_by(notifications::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let notifications = items
            .load::<DbNotification>(&mut conn)?
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, notifications))
    }

    fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let unread: i64 = notifications::table
            .filter(notifications::user_id.eq(user_id.get()))
            .filter(notifications::is_read.eq(false))
            .select(count_star())
            .get_result(&mut conn)?;

        Ok(unread as usize)
    }

    fn notification_exists(
        &self,
        user_id: UserId,
        notification_type: NotificationType,
        related_type: &str,
        related_id: i32,
        since: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let found = diesel::select(exists(
            notifications::table
                .filter(notifications::user_id.eq(user_id.get()))
                .filter(notifications::notification_type.eq(notification_type.as_str()))
                .filter(notifications::related_type.eq(related_type))
                .filter(notifications::related_id.eq(related_id))
                .filter(notifications::created_at.ge(since)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(found)
    }
}

impl NotificationWriter for DieselRepository {
    fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> RepositoryResult<Notification> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let db_notification = diesel::insert_into(notifications::table)
            .values(DbNewNotification::from(notification))
            .get_result::<DbNotification>(&mut conn)?;

        Notification::try_from(db_notification).map_err(RepositoryError::from)
    }

    fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.get()))
                .filter(notifications::user_id.eq(user_id.get())),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id.get()))
                .filter(notifications::is_read.eq(false)),
        )
        .set((
            notifications::is_read.eq(true),
            notifications::read_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(updated)
    }

    fn delete_notification(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()> {
        use crate::schema::notifications;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            notifications::table
                .filter(notifications::id.eq(id.get()))
                .filter(notifications::user_id.eq(user_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
