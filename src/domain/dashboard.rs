use serde::Serialize;

use crate::domain::email::EmailHistory;
use crate::domain::invoice::Invoice;
use crate::domain::quotation::Quotation;

/// Number of records with a given status.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Aggregates shown on the dashboard landing page.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_quotations: usize,
    pub total_invoices: usize,
    pub total_clients: usize,
    pub total_partners: usize,
    pub quotations_by_status: Vec<StatusCount>,
    pub invoices_by_status: Vec<StatusCount>,
    pub recent_quotations: Vec<Quotation>,
    pub recent_invoices: Vec<Invoice>,
    pub recent_emails: Vec<EmailHistory>,
}
