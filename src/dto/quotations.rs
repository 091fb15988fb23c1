//! DTOs for quotation pages.

use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;
use crate::domain::template::Template;
use crate::pagination::Paginated;

/// Quotation row with the client name resolved for display.
#[derive(Debug, Serialize)]
pub struct QuotationRow {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub client_name: Option<String>,
}

#[derive(Debug)]
pub struct QuotationsPageData {
    pub quotations: Paginated<QuotationRow>,
    /// Clients and templates offered by the generate form.
    pub clients: Vec<Client>,
    pub templates: Vec<Template>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug)]
pub struct QuotationPageData {
    pub quotation: Quotation,
    pub client: Option<Client>,
    pub invoices: Vec<Invoice>,
    /// Invoice templates offered when the quotation is accepted.
    pub invoice_templates: Vec<Template>,
    /// Placeholders still present in the quotation document.
    pub unfilled: Vec<String>,
    pub editor_script_url: String,
}
