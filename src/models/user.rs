//! Diesel models representing dashboard users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::role::Role;
use crate::domain::types::{PersonName, TypeConstraintError, UserEmail, UserId};
use crate::domain::user::{NewUser as DomainNewUser, UpdateUser as DomainUpdateUser, User as DomainUser};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`].
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role_id: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role_id: i32,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            name: PersonName::new(user.name)?,
            email: UserEmail::new(user.email)?,
            role: Role::try_from(user.role_id)?,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            name: user.name.as_str(),
            email: user.email.as_str(),
            role_id: user.role.id(),
        }
    }
}

impl<'a> From<&'a DomainUpdateUser> for UpdateUser<'a> {
    fn from(user: &'a DomainUpdateUser) -> Self {
        Self {
            name: user.name.as_str(),
            email: user.email.as_str(),
            role_id: user.role.id(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_in_row_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = User {
            id: 1,
            name: "Ann".into(),
            email: "ann@example.com".into(),
            role_id: 42,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainUser::try_from(row),
            Err(TypeConstraintError::UnknownRole(42))
        );
    }

    #[test]
    fn new_user_uses_role_id() {
        let domain = DomainNewUser::new(
            PersonName::new("Ann").unwrap(),
            UserEmail::new("ann@example.com").unwrap(),
            Role::Admin,
        );
        let insertable = NewUser::from(&domain);
        assert_eq!(insertable.role_id, 2);
        assert_eq!(insertable.email, "ann@example.com");
    }
}
