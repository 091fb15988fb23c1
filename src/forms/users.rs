use serde::Deserialize;
use validator::Validate;

use crate::domain::role::Role;
use crate::domain::types::{PersonName, UserEmail};
use crate::domain::user::{NewUser, UpdateUser};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Form data for adding or editing a dashboard user.
pub struct UserForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role_id: i32,
}

/// Validated values shared by user creation and update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPayload {
    pub name: PersonName,
    pub email: UserEmail,
    pub role: Role,
}

impl TryFrom<UserForm> for UserPayload {
    type Error = FormError;

    fn try_from(form: UserForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: PersonName::new(form.name)?,
            email: UserEmail::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            role: Role::try_from(form.role_id)?,
        })
    }
}

impl From<UserPayload> for NewUser {
    fn from(payload: UserPayload) -> Self {
        NewUser::new(payload.name, payload.email, payload.role)
    }
}

impl From<UserPayload> for UpdateUser {
    fn from(payload: UserPayload) -> Self {
        UpdateUser::new(payload.name, payload.email, payload.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_is_rejected() {
        let form = UserForm {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            role_id: 9,
        };
        assert!(matches!(
            UserPayload::try_from(form),
            Err(FormError::Constraint(_))
        ));
    }

    #[test]
    fn email_is_normalised() {
        let form = UserForm {
            name: "Sam".into(),
            email: "Sam@Example.com".into(),
            role_id: 2,
        };
        let payload = UserPayload::try_from(form).unwrap();
        assert_eq!(payload.email.as_str(), "sam@example.com");
        assert_eq!(payload.role, Role::Admin);
    }
}
