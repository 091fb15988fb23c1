//! DTOs for invoice pages.

use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;
use crate::domain::template::Template;
use crate::pagination::Paginated;

/// Invoice row with the client name resolved for display.
#[derive(Debug, Serialize)]
pub struct InvoiceRow {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client_name: Option<String>,
}

#[derive(Debug)]
pub struct InvoicesPageData {
    pub invoices: Paginated<InvoiceRow>,
    /// Accepted quotations that can be invoiced.
    pub quotations: Vec<Quotation>,
    pub templates: Vec<Template>,
    /// Whether the caller may generate and edit invoices.
    pub can_manage: bool,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug)]
pub struct InvoicePageData {
    pub invoice: Invoice,
    pub client: Option<Client>,
    pub quotation: Option<Quotation>,
    pub can_manage: bool,
    pub unfilled: Vec<String>,
    pub editor_script_url: String,
}
