//! Repository implementation for partner companies.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::partner::{ContractFile, NewPartner, Partner, UpdatePartner};
use crate::domain::types::{ContactEmail, PartnerId};
use crate::models::partner::{
    NewPartner as DbNewPartner, Partner as DbPartner, PartnerContract as DbPartnerContract,
    UpdatePartner as DbUpdatePartner,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, PartnerListQuery, PartnerReader, PartnerWriter, like_pattern,
};

impl PartnerReader for DieselRepository {
    fn get_partner_by_id(&self, id: PartnerId) -> RepositoryResult<Option<Partner>> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        partners::table
            .find(id.get())
            .first::<DbPartner>(&mut conn)
            .optional()?
            .map(Partner::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_partner_by_email(&self, email: &ContactEmail) -> RepositoryResult<Option<Partner>> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        partners::table
            .filter(partners::email_address.eq(email.as_str()))
            .first::<DbPartner>(&mut conn)
            .optional()?
            .map(Partner::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_partners(&self, query: PartnerListQuery) -> RepositoryResult<(usize, Vec<Partner>)> {
        use crate::schema::partners;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: partners::BoxedQuery<'_, Sqlite> = partners::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    partners::company_name
                        .like(pattern.clone())
                        .or(partners::contact_person_name.like(pattern.clone()))
                        .or(partners::email_address.like(pattern)),
                );
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered().order(partners::company_name.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let partners = items
            .load::<DbPartner>(&mut conn)?
            .into_iter()
            .map(Partner::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, partners))
    }
}

impl PartnerWriter for DieselRepository {
    fn create_partner(&self, new_partner: &NewPartner) -> RepositoryResult<Partner> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        let db_partner = diesel::insert_into(partners::table)
            .values(DbNewPartner::from(new_partner))
            .get_result::<DbPartner>(&mut conn)?;

        Partner::try_from(db_partner).map_err(RepositoryError::from)
    }

    fn update_partner(&self, id: PartnerId, updates: &UpdatePartner) -> RepositoryResult<Partner> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        let db_partner = diesel::update(partners::table.find(id.get()))
            .set(DbUpdatePartner::from(updates))
            .get_result::<DbPartner>(&mut conn)?;

        Partner::try_from(db_partner).map_err(RepositoryError::from)
    }

    fn set_partner_contract(
        &self,
        id: PartnerId,
        contract: &ContractFile,
    ) -> RepositoryResult<Partner> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        let db_partner = diesel::update(partners::table.find(id.get()))
            .set(DbPartnerContract::from(contract))
            .get_result::<DbPartner>(&mut conn)?;

        Partner::try_from(db_partner).map_err(RepositoryError::from)
    }

    fn delete_partner(&self, id: PartnerId) -> RepositoryResult<()> {
        use crate::schema::partners;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(partners::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
