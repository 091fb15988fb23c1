//! Aggregated figures for the dashboard landing page.

use diesel::dsl::count_star;
use diesel::prelude::*;

use crate::domain::dashboard::{DashboardStats, StatusCount};
use crate::domain::email::EmailHistory;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;
use crate::models::email::EmailHistory as DbEmailHistory;
use crate::models::invoice::Invoice as DbInvoice;
use crate::models::quotation::Quotation as DbQuotation;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DashboardReader, DieselRepository};

fn status_counts(rows: Vec<(String, i64)>) -> Vec<StatusCount> {
    rows.into_iter()
        .map(|(status, count)| StatusCount {
            status,
            count: count as usize,
        })
        .collect()
}

impl DashboardReader for DieselRepository {
    fn dashboard_stats(&self, recent: usize) -> RepositoryResult<DashboardStats> {
        use crate::schema::{clients, email_history, invoices, partners, quotations};

        let mut conn = self.conn()?;
        let recent = recent as i64;

        let total_quotations: i64 = quotations::table.count().get_result(&mut conn)?;
        let total_invoices: i64 = invoices::table.count().get_result(&mut conn)?;
        let total_clients: i64 = clients::table.count().get_result(&mut conn)?;
        let total_partners: i64 = partners::table.count().get_result(&mut conn)?;

        let quotations_by_status = quotations::table
            .group_by(quotations::status)
            .select((quotations::status, count_star()))
            .order(quotations::status.asc())
            .load::<(String, i64)>(&mut conn)?;

        let invoices_by_status = invoices::table
            .group_by(invoices::status)
            .select((invoices::status, count_star()))
            .order(invoices::status.asc())
            .load::<(String, i64)>(&mut conn)?;

        let recent_quotations = quotations::table
            .order(quotations::created_at.desc())
            .then_order_by(quotations::id.desc())
            .limit(recent)
            .load::<DbQuotation>(&mut conn)?
            .into_iter()
            .map(Quotation::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        let recent_invoices = invoices::table
            .order(invoices::created_at.desc())
            .then_order_by(invoices::id.desc())
            .limit(recent)
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        let recent_emails = email_history::table
            .order(email_history::sent_at.desc())
            .then_order_by(email_history::id.desc())
            .limit(recent)
            .load::<DbEmailHistory>(&mut conn)?
            .into_iter()
            .map(EmailHistory::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok(DashboardStats {
            total_quotations: total_quotations as usize,
            total_invoices: total_invoices as usize,
            total_clients: total_clients as usize,
            total_partners: total_partners as usize,
            quotations_by_status: status_counts(quotations_by_status),
            invoices_by_status: status_counts(invoices_by_status),
            recent_quotations,
            recent_invoices,
            recent_emails,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rows_become_counts() {
        let counts = status_counts(vec![("paid".into(), 2), ("unpaid".into(), 5)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[1].status, "unpaid");
        assert_eq!(counts[1].count, 5);
    }
}
