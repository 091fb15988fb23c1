use crate::domain::dashboard::DashboardStats;

/// Data required to render the landing page.
#[derive(Debug)]
pub struct DashboardPageData {
    pub stats: DashboardStats,
    pub unread_notifications: usize,
}
