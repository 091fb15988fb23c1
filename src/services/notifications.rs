//! Services for the signed-in user's notifications.

use crate::ALL_ROLES;
use crate::domain::notification::Notification;
use crate::domain::types::NotificationId;
use crate::dto::ListQuery;
use crate::dto::notifications::{NotificationsPageData, UnreadCount};
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{NotificationListQuery, NotificationReader, NotificationWriter, UserWriter};
use crate::services::users::resolve_user;
use crate::services::{ServiceResult, log_failure};

pub fn list_notifications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<NotificationsPageData>
where
    R: NotificationReader + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    let page = query.page();
    let mut list_query = NotificationListQuery::new(me.id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if query.unread_only() {
        list_query = list_query.unread_only();
    }
    let (total, notifications) = repo.list_notifications(list_query)?;

    Ok(NotificationsPageData {
        notifications: Paginated::new(notifications, page, total),
        unread: repo.count_unread_notifications(me.id)?,
        unread_only: query.unread_only(),
    })
}

/// First page of notifications for the JSON API.
pub fn recent_notifications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<Vec<Notification>>
where
    R: NotificationReader + UserWriter + ?Sized,
{
    Ok(list_notifications(repo, user, query)?.notifications.items)
}

pub fn unread_count<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<UnreadCount>
where
    R: NotificationReader + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    Ok(UnreadCount {
        count: repo.count_unread_notifications(me.id)?,
    })
}

pub fn mark_read<R>(repo: &R, user: &AuthenticatedUser, notification_id: i32) -> ServiceResult<()>
where
    R: NotificationWriter + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    repo.mark_notification_read(NotificationId::new(notification_id)?, me.id)
        .map_err(Into::into)
        .map_err(log_failure("mark notification read"))
}

/// Marks every notification of the caller as read and returns how many changed.
pub fn mark_all_read<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<usize>
where
    R: NotificationWriter + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    Ok(repo.mark_all_notifications_read(me.id)?)
}

pub fn delete_notification<R>(
    repo: &R,
    user: &AuthenticatedUser,
    notification_id: i32,
) -> ServiceResult<()>
where
    R: NotificationWriter + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    Ok(repo.delete_notification(NotificationId::new(notification_id)?, me.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::Role;
    use crate::domain::types::{UserEmail, UserId};
    use crate::domain::user::User;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use chrono::Utc;

    fn auth() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "9".into(),
            email: "user@example.com".into(),
            name: "User".into(),
            role_id: Role::User.id(),
            exp: 0,
        }
    }

    fn repo_with_user() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_sync_user().returning(|new_user| {
            let now = Utc::now().naive_utc();
            Ok(User {
                id: UserId::new(9).unwrap(),
                name: new_user.name.clone(),
                email: UserEmail::new(new_user.email.as_str()).unwrap(),
                role: new_user.role,
                created_at: now,
                updated_at: now,
            })
        });
        repo
    }

    #[test]
    fn unread_filter_is_passed_to_the_repository() {
        let mut repo = repo_with_user();
        repo.expect_list_notifications()
            .withf(|query| query.unread_only && query.user_id.get() == 9)
            .returning(|_| Ok((0, vec![])));
        repo.expect_count_unread_notifications().returning(|_| Ok(4));

        let query = ListQuery {
            unread: Some("true".into()),
            ..ListQuery::default()
        };
        let data = list_notifications(&repo, &auth(), &query).unwrap();
        assert_eq!(data.unread, 4);
        assert!(data.unread_only);
    }

    #[test]
    fn foreign_notification_is_not_found() {
        let mut repo = repo_with_user();
        repo.expect_mark_notification_read()
            .returning(|_, _| Err(RepositoryError::NotFound));

        let result = mark_read(&repo, &auth(), 3);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn unread_count_is_scoped_to_the_caller() {
        let mut repo = repo_with_user();
        repo.expect_count_unread_notifications()
            .withf(|id| id.get() == 9)
            .returning(|_| Ok(2));

        assert_eq!(unread_count(&repo, &auth()).unwrap(), UnreadCount { count: 2 });
    }
}
