//! Services managing the local user directory.

use crate::ADMIN_ROLES;
use crate::domain::role::Role;
use crate::domain::types::UserId;
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::dto::ListQuery;
use crate::dto::users::UsersPageData;
use crate::forms::users::{UserForm, UserPayload};
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult, delete_conflict};

/// Records the signed-in user locally so it can own quotations, emails and
/// notifications.
pub(crate) fn resolve_user<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let new_user = NewUser::try_from(user)?;
    Ok(repo.sync_user(&new_user)?)
}

/// Roles `caller` may hand out.
pub fn assignable_roles(caller: Role) -> Vec<Role> {
    match caller {
        Role::Superadmin => Role::ALL.to_vec(),
        Role::Admin => vec![Role::Admin, Role::User],
        Role::User => Vec::new(),
    }
}

fn ensure_assignable(caller: Role, role: Role) -> ServiceResult<()> {
    if assignable_roles(caller).contains(&role) {
        Ok(())
    } else {
        Err(ServiceError::Form(format!("You cannot assign the {role} role")))
    }
}

/// Users visible to the caller.
///
/// Superadmins see everybody but themselves; admins only see plain users.
pub fn list_users<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<UsersPageData>
where
    R: UserReader + UserWriter + ?Sized,
{
    let caller = ensure_role(user.role_id, ADMIN_ROLES)?;
    let me = resolve_user(repo, user)?;

    let page = query.page();
    let mut list_query = UserListQuery::new()
        .exclude(me.id)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if caller == Role::Admin {
        list_query = list_query.role(Role::User);
    }

    let (total, users) = repo.list_users(list_query)?;

    Ok(UsersPageData {
        users: Paginated::new(users, page, total),
        roles: assignable_roles(caller),
        search: query.search().map(str::to_string),
    })
}

pub fn create_user<R>(repo: &R, user: &AuthenticatedUser, form: UserForm) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let caller = ensure_role(user.role_id, ADMIN_ROLES)?;
    let payload = UserPayload::try_from(form)?;
    ensure_assignable(caller, payload.role)?;

    if repo.get_user_by_email(&payload.email)?.is_some() {
        return Err(ServiceError::Conflict("Email already exists".to_string()));
    }

    let created = repo.create_user(&NewUser::from(payload))?;
    log::info!("User {} created by {}", created.id, user.email);
    Ok(created)
}

pub fn update_user<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    form: UserForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let caller = ensure_role(user.role_id, ADMIN_ROLES)?;
    let payload = UserPayload::try_from(form)?;
    ensure_assignable(caller, payload.role)?;

    let user_id = UserId::new(user_id)?;
    let existing = repo.get_user_by_id(user_id)?.ok_or(ServiceError::NotFound)?;
    ensure_assignable(caller, existing.role)?;

    if let Some(other) = repo.get_user_by_email(&payload.email)?
        && other.id != user_id
    {
        return Err(ServiceError::Conflict("Email already exists".to_string()));
    }

    Ok(repo.update_user(user_id, &UpdateUser::from(payload))?)
}

pub fn delete_user<R>(repo: &R, user: &AuthenticatedUser, user_id: i32) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let caller = ensure_role(user.role_id, ADMIN_ROLES)?;
    let user_id = UserId::new(user_id)?;
    let existing = repo.get_user_by_id(user_id)?.ok_or(ServiceError::NotFound)?;
    ensure_assignable(caller, existing.role)?;

    if existing.email.as_str() == user.email.trim().to_lowercase() {
        return Err(ServiceError::Form("You cannot delete yourself".to_string()));
    }

    repo.delete_user(user_id).map_err(delete_conflict("user"))?;
    log::info!("User {user_id} deleted by {}", user.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{PersonName, UserEmail};
    use crate::repository::mock::MockRepository;
    use chrono::Utc;

    fn auth(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "boss@example.com".into(),
            name: "Boss".into(),
            role_id: role.id(),
            exp: 0,
        }
    }

    fn stored(id: i32, email: &str, role: Role) -> User {
        let now = Utc::now().naive_utc();
        User {
            id: UserId::new(id).unwrap(),
            name: PersonName::new("Someone").unwrap(),
            email: UserEmail::new(email).unwrap(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn form(role: Role) -> UserForm {
        UserForm {
            name: "New".into(),
            email: "new@example.com".into(),
            role_id: role.id(),
        }
    }

    #[test]
    fn plain_users_cannot_manage_users() {
        let repo = MockRepository::new();
        let result = create_user(&repo, &auth(Role::User), form(Role::User));
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn admins_cannot_grant_superadmin() {
        let repo = MockRepository::new();
        let result = create_user(&repo, &auth(Role::Admin), form(Role::Superadmin));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|email| Ok(Some(stored(4, email.as_str(), Role::User))));
        repo.expect_create_user().never();

        let result = create_user(&repo, &auth(Role::Superadmin), form(Role::User));
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn admins_only_list_plain_users() {
        let mut repo = MockRepository::new();
        repo.expect_sync_user()
            .returning(|_| Ok(stored(1, "boss@example.com", Role::Admin)));
        repo.expect_list_users()
            .withf(|query| {
                query.role == Some(Role::User) && query.exclude == UserId::new(1).ok()
            })
            .returning(|_| Ok((0, vec![])));

        let data = list_users(&repo, &auth(Role::Admin), &ListQuery::default()).unwrap();
        assert_eq!(data.roles, vec![Role::Admin, Role::User]);
    }

    #[test]
    fn users_cannot_delete_themselves() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_id()
            .returning(|id| Ok(Some(stored(id.get(), "boss@example.com", Role::Admin))));
        repo.expect_delete_user().never();

        let result = delete_user(&repo, &auth(Role::Superadmin), 1);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
