use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::role::Role;
use crate::domain::types::{PersonName, UserEmail, UserId};

/// Dashboard user known to the local directory.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: PersonName,
    pub email: UserEmail,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to register a user.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: PersonName,
    pub email: UserEmail,
    pub role: Role,
}

impl NewUser {
    #[must_use]
    pub fn new(name: PersonName, email: UserEmail, role: Role) -> Self {
        Self { name, email, role }
    }
}

/// Replacement values for an existing user.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateUser {
    pub name: PersonName,
    pub email: UserEmail,
    pub role: Role,
}

impl UpdateUser {
    #[must_use]
    pub fn new(name: PersonName, email: UserEmail, role: Role) -> Self {
        Self { name, email, role }
    }
}
