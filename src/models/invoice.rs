use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::StoredFile;
use crate::domain::invoice::{
    Invoice as DomainInvoice, InvoiceStatus, NewInvoice as DomainNewInvoice,
    UpdateInvoice as DomainUpdateInvoice,
};
use crate::domain::types::{
    ClientId, InvoiceId, QuotationId, TemplateId, TypeConstraintError, UserId,
};
use crate::models::quotation::{parse_company_info, parse_contact};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub invoice_number: String,
    pub quotation_id: i32,
    pub client_id: i32,
    pub selected_contact: String,
    pub template_id: i32,
    pub my_company_info: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
    pub status: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub invoice_number: &'a str,
    pub quotation_id: i32,
    pub client_id: i32,
    pub selected_contact: String,
    pub template_id: i32,
    pub my_company_info: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub status: &'a str,
    pub created_by: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateInvoice<'a> {
    pub status: &'a str,
    pub due_date: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Invoice> for DomainInvoice {
    type Error = TypeConstraintError;

    fn try_from(invoice: Invoice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvoiceId::try_from(invoice.id)?,
            selected_contact: parse_contact(&invoice.selected_contact)?,
            my_company_info: parse_company_info(invoice.my_company_info.as_deref())?,
            invoice_number: invoice.invoice_number,
            quotation_id: QuotationId::try_from(invoice.quotation_id)?,
            client_id: ClientId::try_from(invoice.client_id)?,
            template_id: TemplateId::try_from(invoice.template_id)?,
            file: StoredFile::from_parts(invoice.file_path, invoice.file_name, invoice.file_size),
            due_date: invoice.due_date,
            status: InvoiceStatus::try_from(invoice.status)?,
            created_by: UserId::try_from(invoice.created_by)?,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewInvoice> for NewInvoice<'a> {
    type Error = serde_json::Error;

    fn try_from(invoice: &'a DomainNewInvoice) -> Result<Self, Self::Error> {
        Ok(Self {
            invoice_number: invoice.invoice_number.as_str(),
            quotation_id: invoice.quotation_id.get(),
            client_id: invoice.client_id.get(),
            selected_contact: serde_json::to_string(&invoice.selected_contact)?,
            template_id: invoice.template_id.get(),
            my_company_info: invoice
                .my_company_info
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            due_date: invoice.due_date,
            status: InvoiceStatus::Unpaid.as_str(),
            created_by: invoice.created_by.get(),
        })
    }
}

impl<'a> From<&'a DomainUpdateInvoice> for UpdateInvoice<'a> {
    fn from(update: &'a DomainUpdateInvoice) -> Self {
        Self {
            status: update.status.as_str(),
            due_date: update.due_date,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_into_domain() {
        let now = chrono::Utc::now().naive_utc();
        let row = Invoice {
            id: 3,
            invoice_number: "INV-2025-0003".into(),
            quotation_id: 2,
            client_id: 1,
            selected_contact: r#"{"name":"Jane","email":"jane@acme.sg","phone":null}"#.into(),
            template_id: 5,
            my_company_info: None,
            file_path: Some("invoices/INV-2025-0003.docx".into()),
            file_name: Some("INV-2025-0003.docx".into()),
            file_size: Some(2048),
            due_date: None,
            status: "paid".into(),
            created_by: 1,
            created_at: now,
            updated_at: now,
        };
        let invoice = DomainInvoice::try_from(row).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.file.unwrap().size, 2048);
        assert_eq!(invoice.selected_contact.email.as_str(), "jane@acme.sg");
    }
}
