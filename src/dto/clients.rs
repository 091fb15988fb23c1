//! DTOs for the client list and detail pages.

use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::partner::Partner;
use crate::domain::quotation::Quotation;
use crate::pagination::Paginated;

/// Data required to render the client list.
#[derive(Debug)]
pub struct ClientsPageData {
    pub clients: Paginated<Client>,
    /// Industries offered by the filter drop-down.
    pub industries: Vec<String>,
    /// Partners offered by the create form.
    pub partners: Vec<Partner>,
    pub search: Option<String>,
    pub industry: Option<String>,
}

/// Data required to render the client detail and edit page.
#[derive(Debug)]
pub struct ClientPageData {
    pub client: Client,
    pub partner: Option<Partner>,
    pub partners: Vec<Partner>,
    pub quotations: Vec<Quotation>,
}

/// Page of clients returned by `/api/v1/clients`.
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub total: usize,
    pub page: usize,
    pub clients: Vec<Client>,
}
