use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::client::Contact;
use crate::domain::company::CompanyInfo;
use crate::domain::document::StoredFile;
use crate::domain::types::{ClientId, QuotationId, TemplateId, UserId, string_enum};

string_enum!(
    QuotationStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Quotation {
    pub id: QuotationId,
    pub quotation_number: String,
    pub client_id: ClientId,
    pub selected_contact: Contact,
    pub template_id: TemplateId,
    pub my_company_info: Option<CompanyInfo>,
    pub file: Option<StoredFile>,
    pub due_date: Option<NaiveDateTime>,
    pub status: QuotationStatus,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewQuotation {
    pub quotation_number: String,
    pub client_id: ClientId,
    pub selected_contact: Contact,
    pub template_id: TemplateId,
    pub my_company_info: Option<CompanyInfo>,
    pub due_date: Option<NaiveDateTime>,
    pub created_by: UserId,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateQuotation {
    pub status: QuotationStatus,
    pub due_date: Option<NaiveDateTime>,
}
