//! Repository implementation for dashboard users.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::upsert::excluded;

use crate::domain::types::{UserEmail, UserId};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::models::user::{
    NewUser as DbNewUser, UpdateUser as DbUpdateUser, User as DbUser,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserWriter, like_pattern};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(User::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: users::BoxedQuery<'_, Sqlite> = users::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    users::name
                        .like(pattern.clone())
                        .or(users::email.like(pattern)),
                );
            }
            if let Some(role) = query.role {
                items = items.filter(users::role_id.eq(role.id()));
            }
            if let Some(exclude) = query.exclude {
                items = items.filter(users::id.ne(exclude.get()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered().order(users::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let users = items
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, users))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::insert_into(users::table)
            .values(DbNewUser::from(new_user))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn sync_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::insert_into(users::table)
            .values(DbNewUser::from(new_user))
            .on_conflict(users::email)
            .do_update()
            .set(users::name.eq(excluded(users::name)))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = diesel::update(users::table.find(id.get()))
            .set(DbUpdateUser::from(updates))
            .get_result::<DbUser>(&mut conn)?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(users::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
