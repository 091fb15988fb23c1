//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::company::{CompanySettings, UpdateCompanySettings};
use crate::domain::dashboard::DashboardStats;
use crate::domain::document::StoredFile;
use crate::domain::email::{
    EmailHistory, EmailTemplate, NewEmailHistory, NewEmailTemplate, UpdateEmailTemplate,
};
use crate::domain::invoice::{Invoice, NewInvoice, UpdateInvoice};
use crate::domain::notification::{NewNotification, Notification, NotificationType};
use crate::domain::partner::{ContractFile, NewPartner, Partner, UpdatePartner};
use crate::domain::quotation::{NewQuotation, Quotation, UpdateQuotation};
use crate::domain::template::{NewTemplate, Template, UpdateTemplate};
use crate::domain::types::{
    ClientId, ContactEmail, EmailHistoryId, EmailTemplateId, InvoiceId, NotificationId,
    PartnerId, QuotationId, TemplateId, UserEmail, UserId,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, CompanySettingsReader, CompanySettingsWriter,
    DashboardReader, EmailHistoryListQuery, EmailHistoryReader, EmailHistoryWriter,
    EmailTemplateListQuery, EmailTemplateReader, EmailTemplateWriter, InvoiceListQuery,
    InvoiceReader, InvoiceWriter, NotificationListQuery, NotificationReader, NotificationWriter,
    PartnerListQuery, PartnerReader, PartnerWriter, QuotationListQuery, QuotationReader,
    QuotationWriter, TemplateListQuery, TemplateReader, TemplateWriter, UserListQuery,
    UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn sync_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
        fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
        fn list_client_industries(&self) -> RepositoryResult<Vec<String>>;
        fn find_client_by_contact_email(
            &self,
            email: &ContactEmail,
            exclude: Option<ClientId>,
        ) -> RepositoryResult<Option<ClientId>>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
    }

    impl PartnerReader for Repository {
        fn get_partner_by_id(&self, id: PartnerId) -> RepositoryResult<Option<Partner>>;
        fn get_partner_by_email(&self, email: &ContactEmail) -> RepositoryResult<Option<Partner>>;
        fn list_partners(&self, query: PartnerListQuery) -> RepositoryResult<(usize, Vec<Partner>)>;
    }

    impl PartnerWriter for Repository {
        fn create_partner(&self, new_partner: &NewPartner) -> RepositoryResult<Partner>;
        fn update_partner(&self, id: PartnerId, updates: &UpdatePartner) -> RepositoryResult<Partner>;
        fn set_partner_contract(
            &self,
            id: PartnerId,
            contract: &ContractFile,
        ) -> RepositoryResult<Partner>;
        fn delete_partner(&self, id: PartnerId) -> RepositoryResult<()>;
    }

    impl TemplateReader for Repository {
        fn get_template_by_id(&self, id: TemplateId) -> RepositoryResult<Option<Template>>;
        fn list_templates(&self, query: TemplateListQuery)
        -> RepositoryResult<(usize, Vec<Template>)>;
    }

    impl TemplateWriter for Repository {
        fn create_template(&self, new_template: &NewTemplate) -> RepositoryResult<Template>;
        fn update_template(
            &self,
            id: TemplateId,
            updates: &UpdateTemplate,
        ) -> RepositoryResult<Template>;
        fn set_template_file(&self, id: TemplateId, file: &StoredFile) -> RepositoryResult<Template>;
        fn delete_template(&self, id: TemplateId) -> RepositoryResult<()>;
    }

    impl QuotationReader for Repository {
        fn get_quotation_by_id(&self, id: QuotationId) -> RepositoryResult<Option<Quotation>>;
        fn list_quotations(
            &self,
            query: QuotationListQuery,
        ) -> RepositoryResult<(usize, Vec<Quotation>)>;
        fn latest_quotation_number(&self, prefix: &str) -> RepositoryResult<Option<String>>;
        fn list_due_quotations(
            &self,
            after: NaiveDateTime,
            until: NaiveDateTime,
        ) -> RepositoryResult<Vec<Quotation>>;
    }

    impl QuotationWriter for Repository {
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

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(&self, id: InvoiceId) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
        fn latest_invoice_number(&self, prefix: &str) -> RepositoryResult<Option<String>>;
        fn list_invoices_for_quotation(&self, id: QuotationId) -> RepositoryResult<Vec<Invoice>>;
        fn list_due_invoices(
            &self,
            after: NaiveDateTime,
            until: NaiveDateTime,
        ) -> RepositoryResult<Vec<Invoice>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn update_invoice(&self, id: InvoiceId, updates: &UpdateInvoice) -> RepositoryResult<Invoice>;
        fn set_invoice_file(&self, id: InvoiceId, file: &StoredFile) -> RepositoryResult<Invoice>;
        fn delete_invoice(&self, id: InvoiceId) -> RepositoryResult<()>;
    }

    impl EmailTemplateReader for Repository {
        fn get_email_template_by_id(
            &self,
            id: EmailTemplateId,
        ) -> RepositoryResult<Option<EmailTemplate>>;
        fn list_email_templates(
            &self,
            query: EmailTemplateListQuery,
        ) -> RepositoryResult<(usize, Vec<EmailTemplate>)>;
    }

    impl EmailTemplateWriter for Repository {
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

    impl EmailHistoryReader for Repository {
        fn get_email_history_by_id(&self, id: EmailHistoryId)
        -> RepositoryResult<Option<EmailHistory>>;
        fn list_email_history(
            &self,
            query: EmailHistoryListQuery,
        ) -> RepositoryResult<(usize, Vec<EmailHistory>)>;
    }

    impl EmailHistoryWriter for Repository {
        fn create_email_history(&self, history: &NewEmailHistory) -> RepositoryResult<EmailHistory>;
    }

    impl NotificationReader for Repository {
        fn list_notifications(
            &self,
            query: NotificationListQuery,
        ) -> RepositoryResult<(usize, Vec<Notification>)>;
        fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize>;
        fn notification_exists(
            &self,
            user_id: UserId,
            notification_type: NotificationType,
            related_type: &str,
            related_id: i32,
            since: NaiveDateTime,
        ) -> RepositoryResult<bool>;
    }

    impl NotificationWriter for Repository {
        fn create_notification(&self, notification: &NewNotification)
        -> RepositoryResult<Notification>;
        fn mark_notification_read(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()>;
        fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize>;
        fn delete_notification(&self, id: NotificationId, user_id: UserId) -> RepositoryResult<()>;
    }

    impl CompanySettingsReader for Repository {
        fn get_company_settings(&self) -> RepositoryResult<CompanySettings>;
    }

    impl CompanySettingsWriter for Repository {
        fn save_company_settings(
            &self,
            settings: &UpdateCompanySettings,
        ) -> RepositoryResult<CompanySettings>;
    }

    impl DashboardReader for Repository {
        fn dashboard_stats(&self, recent: usize) -> RepositoryResult<DashboardStats>;
    }
}
