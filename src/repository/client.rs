//! Repository implementation for client companies.

use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::types::{ClientId, ContactEmail};
use crate::models::client::{
    Client as DbClient, ClientIdRow, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, DieselRepository, like_pattern,
};

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .find(id.get())
            .first::<DbClient>(&mut conn)
            .optional()?;

        db_client
            .map(Client::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: clients::BoxedQuery<'_, Sqlite> = clients::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    clients::company_name
                        .like(pattern.clone())
                        .or(clients::uen.like(pattern.clone()))
                        .or(clients::industry.like(pattern.clone()))
                        .or(clients::contacts.like(pattern)),
                );
            }
            if let Some(industry) = &query.industry {
                items = items.filter(clients::industry.eq(industry.clone()));
            }
            if let Some(partner_id) = query.partner_id {
                items = items.filter(clients::partner_id.eq(partner_id.get()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered().order(clients::created_at.desc()).then_order_by(clients::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let clients = items
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, clients))
    }

    fn list_client_industries(&self) -> RepositoryResult<Vec<String>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let industries = clients::table
            .select(clients::industry)
            .filter(clients::industry.is_not_null())
            .filter(clients::industry.ne(""))
            .distinct()
            .order(clients::industry.asc())
            .load::<Option<String>>(&mut conn)?;

        Ok(industries.into_iter().flatten().collect())
    }

    fn find_client_by_contact_email(
        &self,
        email: &ContactEmail,
        exclude: Option<ClientId>,
    ) -> RepositoryResult<Option<ClientId>> {
        let mut conn = self.conn()?;

        let row = diesel::sql_query(
            "SELECT clients.id AS id FROM clients, json_each(clients.contacts) AS contact \
             WHERE lower(json_extract(contact.value, '$.email')) = ? AND clients.id != ? \
             LIMIT 1",
        )
        .bind::<Text, _>(email.as_str())
        .bind::<Integer, _>(exclude.map(ClientId::get).unwrap_or(0))
        .get_result::<ClientIdRow>(&mut conn)
        .optional()?;

        row.map(|row| ClientId::new(row.id))
            .transpose()
            .map_err(RepositoryError::from)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = diesel::insert_into(clients::table)
            .values(DbNewClient::try_from(new_client)?)
            .get_result::<DbClient>(&mut conn)?;

        Client::try_from(db_client).map_err(RepositoryError::from)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let insertables = new_clients
            .iter()
            .map(DbNewClient::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let affected = diesel::insert_into(clients::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = diesel::update(clients::table.find(id.get()))
            .set(DbUpdateClient::try_from(updates)?)
            .get_result::<DbClient>(&mut conn)?;

        Client::try_from(db_client).map_err(RepositoryError::from)
    }

    fn delete_client(&self, id: ClientId) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(clients::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
