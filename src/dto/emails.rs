//! DTOs for email templates, the compose page and email history.

use serde::Serialize;

use crate::domain::email::{EmailHistory, EmailTemplate, LinkedDocument};
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;
use crate::pagination::Paginated;

#[derive(Debug)]
pub struct EmailTemplatesPageData {
    pub templates: Paginated<EmailTemplate>,
    pub search: Option<String>,
    pub template_type: Option<String>,
}

/// Compose form values with placeholders already substituted.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct EmailDraft {
    pub recipient_email: String,
    pub recipient_name: String,
    pub subject: String,
    pub body: String,
    pub email_template_id: Option<i32>,
    pub quotation_id: Option<i32>,
    pub invoice_id: Option<i32>,
    /// Placeholders left without a value.
    pub unresolved: Vec<String>,
}

impl EmailDraft {
    pub(crate) fn link(&mut self, document: LinkedDocument) {
        match document {
            LinkedDocument::Quotation(id) => self.quotation_id = Some(id.get()),
            LinkedDocument::Invoice(id) => self.invoice_id = Some(id.get()),
        }
    }
}

#[derive(Debug)]
pub struct ComposePageData {
    pub templates: Vec<EmailTemplate>,
    pub quotations: Vec<Quotation>,
    pub invoices: Vec<Invoice>,
    pub draft: EmailDraft,
}

#[derive(Debug)]
pub struct EmailHistoryPageData {
    pub history: Paginated<EmailHistory>,
    pub search: Option<String>,
    pub status: Option<String>,
}
