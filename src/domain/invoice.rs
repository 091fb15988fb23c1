use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::client::Contact;
use crate::domain::company::CompanyInfo;
use crate::domain::document::StoredFile;
use crate::domain::types::{ClientId, InvoiceId, QuotationId, TemplateId, UserId, string_enum};

string_enum!(
    InvoiceStatus {
        Unpaid => "unpaid",
        Paid => "paid",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub quotation_id: QuotationId,
    pub client_id: ClientId,
    pub selected_contact: Contact,
    pub template_id: TemplateId,
    pub my_company_info: Option<CompanyInfo>,
    pub file: Option<StoredFile>,
    pub due_date: Option<NaiveDateTime>,
    pub status: InvoiceStatus,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub quotation_id: QuotationId,
    pub client_id: ClientId,
    pub selected_contact: Contact,
    pub template_id: TemplateId,
    pub my_company_info: Option<CompanyInfo>,
    pub due_date: Option<NaiveDateTime>,
    pub created_by: UserId,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateInvoice {
    pub status: InvoiceStatus,
    pub due_date: Option<NaiveDateTime>,
}

/// An invoice due date must fall strictly after `today`.
pub fn due_date_is_valid(due: NaiveDate, today: NaiveDate) -> bool {
    due > today
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_must_be_in_the_future() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert!(!due_date_is_valid(today, today));
        assert!(!due_date_is_valid(today.pred_opt().unwrap(), today));
        assert!(due_date_is_valid(today.succ_opt().unwrap(), today));
    }
}
