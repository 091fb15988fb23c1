//! Repository implementation for quotations.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::document::StoredFile;
use crate::domain::quotation::{NewQuotation, Quotation, QuotationStatus, UpdateQuotation};
use crate::domain::types::QuotationId;
use crate::models::quotation::{
    NewQuotation as DbNewQuotation, Quotation as DbQuotation,
    UpdateQuotation as DbUpdateQuotation,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, QuotationListQuery, QuotationReader, QuotationWriter, like_pattern,
};

impl QuotationReader for DieselRepository {
    fn get_quotation_by_id(&self, id: QuotationId) -> RepositoryResult<Option<Quotation>> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        quotations::table
            .find(id.get())
            .first::<DbQuotation>(&mut conn)
            .optional()?
            .map(Quotation::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_quotations(
        &self,
        query: QuotationListQuery,
    ) -> RepositoryResult<(usize, Vec<Quotation>)> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: quotations::BoxedQuery<'_, Sqlite> = quotations::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    quotations::quotation_number
                        .like(pattern.clone())
                        .or(quotations::selected_contact.like(pattern)),
                );
            }
            if let Some(status) = query.status {
                items = items.filter(quotations::status.eq(status.as_str()));
            }
            if let Some(client_id) = query.client_id {
                items = items.filter(quotations::client_id.eq(client_id.get()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered()
            .order(quotations::created_at.desc())
            .then_order_by(quotations::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let quotations = items
            .load::<DbQuotation>(&mut conn)?
            .into_iter()
            .map(Quotation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, quotations))
    }

    fn latest_quotation_number(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        let number = quotations::table
            .select(quotations::quotation_number)
            .filter(quotations::quotation_number.like(format!("{prefix}%")))
            .order(quotations::quotation_number.desc())
            .first::<String>(&mut conn)
            .optional()?;

        Ok(number)
    }

    fn list_due_quotations(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<Quotation>> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        quotations::table
            .filter(quotations::status.eq(QuotationStatus::Pending.as_str()))
            .filter(quotations::due_date.gt(after))
            .filter(quotations::due_date.le(until))
            .order(quotations::due_date.asc())
            .load::<DbQuotation>(&mut conn)?
            .into_iter()
            .map(Quotation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl QuotationWriter for DieselRepository {
    fn create_quotation(&self, new_quotation: &NewQuotation) -> RepositoryResult<Quotation> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        let db_quotation = diesel::insert_into(quotations::table)
            .values(DbNewQuotation::try_from(new_quotation)?)
            .get_result::<DbQuotation>(&mut conn)?;

        Quotation::try_from(db_quotation).map_err(RepositoryError::from)
    }

    fn update_quotation(
        &self,
        id: QuotationId,
        updates: &UpdateQuotation,
    ) -> RepositoryResult<Quotation> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        let db_quotation = diesel::update(quotations::table.find(id.get()))
            .set(DbUpdateQuotation::from(updates))
            .get_result::<DbQuotation>(&mut conn)?;

        Quotation::try_from(db_quotation).map_err(RepositoryError::from)
    }

    fn set_quotation_file(
        &self,
        id: QuotationId,
        file: &StoredFile,
    ) -> RepositoryResult<Quotation> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        let db_quotation = diesel::update(quotations::table.find(id.get()))
            .set((
                quotations::file_path.eq(file.path.as_str()),
                quotations::file_name.eq(file.name.as_str()),
                quotations::file_size.eq(file.size),
                quotations::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbQuotation>(&mut conn)?;

        Quotation::try_from(db_quotation).map_err(RepositoryError::from)
    }

    fn delete_quotation(&self, id: QuotationId) -> RepositoryResult<()> {
        use crate::schema::quotations;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(quotations::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
