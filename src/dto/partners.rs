//! DTOs for partner pages.

use crate::domain::client::Client;
use crate::domain::partner::Partner;
use crate::pagination::Paginated;

#[derive(Debug)]
pub struct PartnersPageData {
    pub partners: Paginated<Partner>,
    pub search: Option<String>,
}

/// Partner with the clients referred by it.
#[derive(Debug)]
pub struct PartnerPageData {
    pub partner: Partner,
    pub clients: Vec<Client>,
}
