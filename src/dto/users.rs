use crate::domain::role::Role;
use crate::domain::user::User;
use crate::pagination::Paginated;

/// Data required to render the user directory.
#[derive(Debug)]
pub struct UsersPageData {
    pub users: Paginated<User>,
    /// Roles the caller may assign.
    pub roles: Vec<Role>,
    pub search: Option<String>,
}
