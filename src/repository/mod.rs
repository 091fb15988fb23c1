//! Persistence layer.
//!
//! Services depend on the reader/writer traits below; [`DieselRepository`]
//! implements all of them on top of the SQLite pool and the mock in
//! [`mock`] stands in for it in unit tests.

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::company::{CompanySettings, UpdateCompanySettings};
use crate::domain::dashboard::DashboardStats;
use crate::domain::document::StoredFile;
use crate::domain::email::{
    EmailHistory, EmailStatus, EmailTemplate, EmailTemplateType, NewEmailHistory,
    NewEmailTemplate, UpdateEmailTemplate,
};
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice, UpdateInvoice};
use crate::domain::notification::{NewNotification, Notification, NotificationType};
use crate::domain::partner::{ContractFile, NewPartner, Partner, UpdatePartner};
use crate::domain::quotation::{NewQuotation, Quotation, QuotationStatus, UpdateQuotation};
use crate::domain::role::Role;
use crate::domain::template::{NewTemplate, Template, TemplateType, UpdateTemplate};
use crate::domain::types::{
    ClientId, ContactEmail, EmailHistoryId, EmailTemplateId, InvoiceId, NotificationId,
    PartnerId, QuotationId, TemplateId, UserEmail, UserId,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::repository::errors::RepositoryResult;

pub mod client;
pub mod company;
pub mod dashboard;
pub mod email;
pub mod errors;
pub mod invoice;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod notification;
pub mod partner;
pub mod quotation;
pub mod template;
pub mod user;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub(crate) fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::try_from(self.page.max(1) - 1)
            .unwrap_or(i64::MAX)
            .saturating_mul(self.limit())
    }
}

/// `LIKE` pattern matching `term` anywhere.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

macro_rules! query_builder_common {
    () => {
        pub fn search(mut self, term: impl Into<String>) -> Self {
            let term = term.into();
            let term = term.trim();
            self.search = (!term.is_empty()).then(|| term.to_string());
            self
        }

        pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
            self.pagination = Some(Pagination { page, per_page });
            self
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub exclude: Option<UserId>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Leaves `id` out of the results, typically the caller.
    pub fn exclude(mut self, id: UserId) -> Self {
        self.exclude = Some(id);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub partner_id: Option<PartnerId>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn partner(mut self, partner_id: PartnerId) -> Self {
        self.partner_id = Some(partner_id);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartnerListQuery {
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl PartnerListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateListQuery {
    pub search: Option<String>,
    pub template_type: Option<TemplateType>,
    pub pagination: Option<Pagination>,
}

impl TemplateListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template_type(mut self, template_type: TemplateType) -> Self {
        self.template_type = Some(template_type);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotationListQuery {
    pub search: Option<String>,
    pub status: Option<QuotationStatus>,
    pub client_id: Option<ClientId>,
    pub pagination: Option<Pagination>,
}

impl QuotationListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: QuotationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceListQuery {
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<ClientId>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailTemplateListQuery {
    pub search: Option<String>,
    pub template_type: Option<EmailTemplateType>,
    pub pagination: Option<Pagination>,
}

impl EmailTemplateListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template_type(mut self, template_type: EmailTemplateType) -> Self {
        self.template_type = Some(template_type);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailHistoryListQuery {
    pub search: Option<String>,
    pub status: Option<EmailStatus>,
    pub pagination: Option<Pagination>,
}

impl EmailHistoryListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: EmailStatus) -> Self {
        self.status = Some(status);
        self
    }

    query_builder_common!();
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationListQuery {
    pub user_id: UserId,
    pub unread_only: bool,
    pub pagination: Option<Pagination>,
}

impl NotificationListQuery {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            unread_only: false,
            pagination: None,
        }
    }

    pub fn unread_only(mut self) -> Self {
        self.unread_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// Inserts the user or refreshes the name of an existing user with the
    /// same email. The stored role is never overwritten.
    fn sync_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
    fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    /// Distinct non-empty industries for the filter drop-down.
    fn list_client_industries(&self) -> RepositoryResult<Vec<String>>;
    /// Client owning a contact with `email`, ignoring `exclude`.
    fn find_client_by_contact_email(
        &self,
        email: &ContactEmail,
        exclude: Option<ClientId>,
    ) -> RepositoryResult<Option<ClientId>>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
    fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
}

pub trait PartnerReader {
    fn get_partner_by_id(&self, id: PartnerId) -> RepositoryResult<Option<Partner>>;
    fn get_partner_by_email(&self, email: &ContactEmail) -> RepositoryResult<Option<Partner>>;
    fn list_partners(&self, query: PartnerListQuery) -> RepositoryResult<(usize, Vec<Partner>)>;
}

pub trait PartnerWriter {
    fn create_partner(&self, new_partner: &NewPartner) -> RepositoryResult<Partner>;
    fn update_partner(&self, id: PartnerId, updates: &UpdatePartner) -> RepositoryResult<Partner>;
    fn set_partner_contract(
        &self,
        id: PartnerId,
        contract: &ContractFile,
    ) -> RepositoryResult<Partner>;
    fn delete_partner(&self, id: PartnerId) -> RepositoryResult<()>;
}

pub trait TemplateReader {
    fn get_template_by_id(&self, id: TemplateId) -> RepositoryResult<Option<Template>>;
    fn list_templates(&self, query: TemplateListQuery)
    -> RepositoryResult<(usize, Vec<Template>)>;
}

pub trait TemplateWriter {
    fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template>;
    fn update_template(
        &self,
        id: TemplateId,
        updates: &UpdateTemplate,
    ) -> RepositoryResult<Template>;
    fn set_template_file(&self, id: TemplateId, file: &StoredFile) -> RepositoryResult<Template>;
    fn delete_template(&self, id: TemplateId) -> RepositoryResult<()>;
}

pub trait QuotationReader {
    fn get_quotation_by_id(&self, id: QuotationId) -> RepositoryResult<Option<Quotation>>;
    fn list_quotations(
        &self,
        query: QuotationListQuery,
    ) -> RepositoryResult<(usize, Vec<Quotation>)>;
    /// Highest quotation number starting with `prefix`.
    fn latest_quotation_number(&self, prefix: &str) -> RepositoryResult<Option<String>>;
    /// Pending quotations due after `after` and no later than `until`.
    fn list_due_quotations(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<Quotation>>;
}

pub trait QuotationWriter {
    fn create_quotation(&self, new_quotation: &NewQuotation) -> RepositoryResult<Quotation>;
    fn update_quotation(
        &self,
        id: QuotationId,
        updates: &UpdateQuotation,
    ) -> RepositoryResult<Quotation>;
    fn set_quotation_file(
        &self,
        id: QuotationId,
        file: &StoredFile,
    ) -> RepositoryResult<Quotation>;
    fn delete_quotation(&self, id: QuotationId) -> RepositoryResult<()>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(&self, id: InvoiceId) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
    /// Highest invoice number starting with `prefix`.
    fn latest_invoice_number(&self, prefix: &str) -> RepositoryResult<Option<String>>;
    fn list_invoices_for_quotation(&self, id: QuotationId) -> RepositoryResult<Vec<Invoice>>;
    /// Unpaid invoices due after `after` and no later than `until`.
    fn list_due_invoices(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invoice>>;
}

pub trait InvoiceWriter {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn update_invoice(&self, id: InvoiceId, updates: &UpdateInvoice) -> RepositoryResult<Invoice>;
    fn set_invoice_file(&self, id: InvoiceId, file: &StoredFile) -> RepositoryResult<Invoice>;
    fn delete_invoice(&self, id: InvoiceId) -> RepositoryResult<()>;
}

pub trait EmailTemplateReader {
    fn get_email_template_by_id(
        &self,
        id: EmailTemplateId,
    ) -> RepositoryResult<Option<EmailTemplate>>;
    fn list_email_templates(
        &self,
        query: EmailTemplateListQuery,
    ) -> RepositoryResult<(usize, Vec<EmailTemplate>)>;
}

pub trait EmailTemplateWriter {
    /// Creates a template; a new default clears the previous default of the
    /// same type.
    fn create_email_template(
        &self,
        new_template: &NewEmailTemplate,
    ) -> RepositoryResult<EmailTemplate>;
    fn update_email_template(
        &self,
        id: EmailTemplateId,
        updates: &UpdateEmailTemplate,
    ) -> RepositoryResult<EmailTemplate>;
    fn delete_email_template(&self, id: EmailTemplateId) -> RepositoryResult<()>;
}

pub trait EmailHistoryReader {
    fn get_email_history_by_id(&self, id: EmailHistoryId)
    -> RepositoryResult<Option<EmailHistory>>;
    fn list_email_history(
        &self,
        query: EmailHistoryListQuery,
    ) -> RepositoryResult<(usize, Vec<EmailHistory>)>;
}

pub trait EmailHistoryWriter {
    fn create_email_history(&self, history: &NewEmailHistory) -> RepositoryResult<EmailHistory>;
}

pub trait NotificationReader {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<(usize, Vec<Notification>)>;
    fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize>;
    /// Whether `user_id` already got a notification of this type about the
    /// related entity since `since`.
    fn notification_exists(
        &self,
        user_id: UserId,
        notification_type: NotificationType,
        related_type: &str,
        related_id: i32,
        since: NaiveDateTime,
    ) -> RepositoryResult<bool>;
}

pub trait NotificationWriter {
    fn create_notification(&self, notification: &NewNotification)
    -> RepositoryResult<Notification>;
    /// Marks one notification of `user_id` as read; `NotFound` otherwise.
    fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()>;
    fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize>;
    fn delete_notification(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()>;
}

pub trait CompanySettingsReader {
    /// Stored settings, or empty settings when none were saved yet.
    fn get_company_settings(&self) -> RepositoryResult<CompanySettings>;
}

pub trait CompanySettingsWriter {
    fn save_company_settings(
        &self,
        settings: &UpdateCompanySettings,
    ) -> RepositoryResult<CompanySettings>;
}

pub trait DashboardReader {
    fn dashboard_stats(&self, recent: usize) -> RepositoryResult<DashboardStats>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        let query = ClientListQuery::new().search("   ");
        assert_eq!(query.search, None);
        let query = ClientListQuery::new().search(" acme ");
        assert_eq!(query.search.as_deref(), Some("acme"));
    }

    #[test]
    fn offset_is_zero_based() {
        let pagination = Pagination {
            page: 3,
            per_page: 20,
        };
        assert_eq!(pagination.offset(), 40);
        let first = Pagination {
            page: 0,
            per_page: 20,
        };
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn huge_pages_do_not_wrap_negative() {
        let pagination = Pagination {
            page: usize::MAX,
            per_page: 20,
        };
        assert_eq!(pagination.offset(), i64::MAX);
    }
}
