//! Numeric dashboard roles.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Role carried by every signed-in user.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Admin,
    User,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Superadmin, Role::Admin, Role::User];

    /// Numeric identifier stored in the users table and issued in tokens.
    pub const fn id(self) -> i32 {
        match self {
            Role::Superadmin => 1,
            Role::Admin => 2,
            Role::User => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Resolves a raw role identifier, returning `None` for unknown ids.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|role| role.id() == id)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Role {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_id(value).ok_or(TypeConstraintError::UnknownRole(value))
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.id()
    }
}
