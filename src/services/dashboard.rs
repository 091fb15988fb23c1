//! Landing page statistics.

use crate::ALL_ROLES;
use crate::dto::dashboard::DashboardPageData;
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{DashboardReader, NotificationReader, UserWriter};
use crate::services::ServiceResult;
use crate::services::users::resolve_user;

/// Number of recent quotations, invoices and emails shown on the dashboard.
pub const RECENT_ITEMS: usize = 5;

pub fn dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DashboardPageData>
where
    R: DashboardReader + NotificationReader + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let me = resolve_user(repo, user)?;

    Ok(DashboardPageData {
        stats: repo.dashboard_stats(RECENT_ITEMS)?,
        unread_notifications: repo.count_unread_notifications(me.id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::DashboardStats;
    use crate::domain::role::Role;
    use crate::domain::types::{UserEmail, UserId};
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use chrono::Utc;

    fn auth(role_id: i32) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "user@example.com".into(),
            name: "User".into(),
            role_id,
            exp: 0,
        }
    }

    #[test]
    fn every_role_sees_the_dashboard() {
        let mut repo = MockRepository::new();
        repo.expect_sync_user().returning(|new_user| {
            let now = Utc::now().naive_utc();
            Ok(User {
                id: UserId::new(1).unwrap(),
                name: new_user.name.clone(),
                email: UserEmail::new(new_user.email.as_str()).unwrap(),
                role: new_user.role,
                created_at: now,
                updated_at: now,
            })
        });
        repo.expect_dashboard_stats()
            .withf(|recent| *recent == RECENT_ITEMS)
            .returning(|_| {
                Ok(DashboardStats {
                    total_clients: 3,
                    ..DashboardStats::default()
                })
            });
        repo.expect_count_unread_notifications().returning(|_| Ok(1));

        let data = dashboard(&repo, &auth(Role::User.id())).unwrap();
        assert_eq!(data.stats.total_clients, 3);
        assert_eq!(data.unread_notifications, 1);
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let repo = MockRepository::new();
        assert!(matches!(
            dashboard(&repo, &auth(42)),
            Err(ServiceError::Forbidden)
        ));
    }
}
