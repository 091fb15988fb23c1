//! Repository implementation for invoices.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::document::StoredFile;
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice, UpdateInvoice};
use crate::domain::types::{InvoiceId, QuotationId};
use crate::models::invoice::{
    Invoice as DbInvoice, NewInvoice as DbNewInvoice, UpdateInvoice as DbUpdateInvoice,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, InvoiceListQuery, InvoiceReader, InvoiceWriter, like_pattern,
};

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(&self, id: InvoiceId) -> RepositoryResult<Option<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        invoices::table
            .find(id.get())
            .first::<DbInvoice>(&mut conn)
            .optional()?
            .map(Invoice::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        let filtered = || {
            let mut items: invoices::BoxedQuery<'_, Sqlite> = invoices::table.into_boxed();
            if let Some(term) = &query.search {
                let pattern = like_pattern(term);
                items = items.filter(
                    invoices::invoice_number
                        .like(pattern.clone())
                        .or(invoices::selected_contact.like(pattern)),
                );
            }
            if let Some(status) = query.status {
                items = items.filter(invoices::status.eq(status.as_str()));
            }
            if let Some(client_id) = query.client_id {
                items = items.filter(invoices::client_id.eq(client_id.get()));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered()
            .order(invoices::created_at.desc())
            .then_order_by(invoices::id.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let invoices = items
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total as usize, invoices))
    }

    fn latest_invoice_number(&self, prefix: &str) -> RepositoryResult<Option<String>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let number = invoices::table
            .select(invoices::invoice_number)
            .filter(invoices::invoice_number.like(format!("{prefix}%")))
            .order(invoices::invoice_number.desc())
            .first::<String>(&mut conn)
            .optional()?;

        Ok(number)
    }

    fn list_invoices_for_quotation(&self, id: QuotationId) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        invoices::table
            .filter(invoices::quotation_id.eq(id.get()))
            .order(invoices::created_at.desc())
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_due_invoices(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        invoices::table
            .filter(invoices::status.eq(InvoiceStatus::Unpaid.as_str()))
            .filter(invoices::due_date.gt(after))
            .filter(invoices::due_date.le(until))
            .order(invoices::due_date.asc())
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let db_invoice = diesel::insert_into(invoices::table)
            .values(DbNewInvoice::try_from(new_invoice)?)
            .get_result::<DbInvoice>(&mut conn)?;

        Invoice::try_from(db_invoice).map_err(RepositoryError::from)
    }

    fn update_invoice(&self, id: InvoiceId, updates: &UpdateInvoice) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let db_invoice = diesel::update(invoices::table.find(id.get()))
            .set(DbUpdateInvoice::from(updates))
            .get_result::<DbInvoice>(&mut conn)?;

        Invoice::try_from(db_invoice).map_err(RepositoryError::from)
    }

    fn set_invoice_file(&self, id: InvoiceId, file: &StoredFile) -> RepositoryResult<Invoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let db_invoice = diesel::update(invoices::table.find(id.get()))
            .set((
                invoices::file_path.eq(file.path.as_str()),
                invoices::file_name.eq(file.name.as_str()),
                invoices::file_size.eq(file.size),
                invoices::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<DbInvoice>(&mut conn)?;

        Invoice::try_from(db_invoice).map_err(RepositoryError::from)
    }

    fn delete_invoice(&self, id: InvoiceId) -> RepositoryResult<()> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(invoices::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
