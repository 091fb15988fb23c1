//! Services for email templates, composing and sending emails and the
//! email history.

use chrono::{NaiveDate, NaiveDateTime};

use crate::ADMIN_ROLES;
use crate::domain::client::Contact;
use crate::domain::company::CompanyInfo;
use crate::domain::document::StoredFile;
use crate::domain::email::{
    EmailHistory, EmailStatus, EmailTemplate, EmailTemplateType, LinkedDocument,
    NewEmailHistory, OutgoingEmail, UpdateEmailTemplate,
};
use crate::domain::invoice::Invoice;
use crate::domain::notification::{NewNotification, NotificationType};
use crate::domain::types::{EmailBody, EmailHistoryId, EmailTemplateId, UserId};
use crate::dto::ListQuery;
use crate::dto::emails::{ComposePageData, EmailDraft, EmailHistoryPageData, EmailTemplatesPageData};
use crate::forms::emails::{
    ComposeQuery, ComposeSelection, EmailTemplateForm, EmailTemplatePayload, SendEmailForm,
    SendEmailPayload,
};
use crate::guard::ensure_role;
use crate::mailer::EmailSender;
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::placeholders::{
    Variables, base_variables, extract_variables, invoice_variables, quotation_variables,
    substitute,
};
use crate::repository::{
    ClientReader, CompanySettingsReader, EmailHistoryListQuery, EmailHistoryReader,
    EmailHistoryWriter, EmailTemplateListQuery, EmailTemplateReader, EmailTemplateWriter,
    InvoiceListQuery, InvoiceReader, NotificationWriter, QuotationListQuery, QuotationReader,
    UserWriter,
};
use crate::services::invoices::load_invoice;
use crate::services::quotations::load_quotation;
use crate::services::users::resolve_user;
use crate::services::{ServiceError, ServiceResult, delete_conflict};
use crate::storage::FileStorage;

fn load_email_template<R>(repo: &R, template_id: i32) -> ServiceResult<EmailTemplate>
where
    R: EmailTemplateReader + ?Sized,
{
    repo.get_email_template_by_id(EmailTemplateId::new(template_id)?)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_email_templates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<EmailTemplatesPageData>
where
    R: EmailTemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let page = query.page();
    let mut list_query = EmailTemplateListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(kind) = query.template_type() {
        list_query = list_query.template_type(EmailTemplateType::try_from(kind)?);
    }
    let (total, templates) = repo.list_email_templates(list_query)?;

    Ok(EmailTemplatesPageData {
        templates: Paginated::new(templates, page, total),
        search: query.search().map(str::to_string),
        template_type: query.template_type().map(str::to_string),
    })
}

pub fn get_email_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<EmailTemplate>
where
    R: EmailTemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;
    load_email_template(repo, template_id)
}

pub fn create_email_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: EmailTemplateForm,
) -> ServiceResult<EmailTemplate>
where
    R: EmailTemplateWriter + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let payload = EmailTemplatePayload::try_from(form)?;
    let creator = resolve_user(repo, user)?;

    Ok(repo.create_email_template(&payload.into_new(creator.id))?)
}

pub fn update_email_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
    form: EmailTemplateForm,
) -> ServiceResult<EmailTemplate>
where
    R: EmailTemplateReader + EmailTemplateWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_email_template(repo, template_id)?;
    let updates = UpdateEmailTemplate::from(EmailTemplatePayload::try_from(form)?);

    Ok(repo.update_email_template(template.id, &updates)?)
}

pub fn delete_email_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<()>
where
    R: EmailTemplateWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    repo.delete_email_template(EmailTemplateId::new(template_id)?)
        .map_err(delete_conflict("email template"))
}

/// Document an email refers to, with everything needed to fill placeholders.
struct DocumentContext {
    number: String,
    contact: Contact,
    file: Option<StoredFile>,
    variables: Variables,
}

fn document_context<R>(
    repo: &R,
    document: LinkedDocument,
    today: NaiveDate,
) -> ServiceResult<DocumentContext>
where
    R: QuotationReader + InvoiceReader + ClientReader + CompanySettingsReader + ?Sized,
{
    let settings = repo.get_company_settings()?;
    let company = CompanyInfo::from(&settings);

    match document {
        LinkedDocument::Quotation(id) => {
            let quotation = load_quotation(repo, id.get())?;
            let client = repo.get_client_by_id(quotation.client_id)?;
            let variables =
                quotation_variables(&quotation, client.as_ref(), Some(&company), today);
            Ok(DocumentContext {
                number: quotation.quotation_number,
                contact: quotation.selected_contact,
                file: quotation.file,
                variables,
            })
        }
        LinkedDocument::Invoice(id) => {
            let invoice = load_invoice(repo, id.get())?;
            let client = repo.get_client_by_id(invoice.client_id)?;
            let variables = invoice_variables(&invoice, client.as_ref(), Some(&company), today);
            Ok(DocumentContext {
                number: invoice.invoice_number,
                contact: invoice.selected_contact,
                file: invoice.file,
                variables,
            })
        }
    }
}

fn template_type_for(document: LinkedDocument) -> EmailTemplateType {
    match document {
        LinkedDocument::Quotation(_) => EmailTemplateType::Quotation,
        LinkedDocument::Invoice(_) => EmailTemplateType::Invoice,
    }
}

/// Placeholders still present after substitution.
fn unresolved_tokens(subject: &str, body: &str) -> Vec<String> {
    let mut unresolved = extract_variables(subject);
    for name in extract_variables(body) {
        if !unresolved.contains(&name) {
            unresolved.push(name);
        }
    }
    unresolved
}

/// Prepares the compose page.
///
/// An explicitly selected template wins; otherwise the default template for
/// the linked document's type is used. Placeholders are filled from the
/// linked document and the ones without a value are reported.
pub fn compose_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ComposeQuery,
    now: NaiveDateTime,
) -> ServiceResult<ComposePageData>
where
    R: EmailTemplateReader
        + QuotationReader
        + InvoiceReader
        + ClientReader
        + CompanySettingsReader
        + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let selection = ComposeSelection::try_from(query)?;
    let (_, templates) = repo.list_email_templates(EmailTemplateListQuery::new())?;
    let (_, quotations) = repo.list_quotations(QuotationListQuery::new())?;
    let (_, invoices) = repo.list_invoices(InvoiceListQuery::new())?;

    let today = now.date();
    let context = selection
        .document
        .map(|document| document_context(repo, document, today))
        .transpose()?;

    let template = match (selection.template_id, selection.document) {
        (Some(id), _) => templates.iter().find(|t| t.id == id).cloned(),
        (None, Some(document)) => {
            let kind = template_type_for(document);
            templates
                .iter()
                .find(|t| t.is_default && t.template_type == kind)
                .cloned()
        }
        (None, None) => None,
    };
    if selection.template_id.is_some() && template.is_none() {
        return Err(ServiceError::NotFound);
    }

    let mut draft = EmailDraft::default();
    if let Some(document) = selection.document {
        draft.link(document);
    }
    if let Some(context) = &context {
        draft.recipient_email = context.contact.email.to_string();
        draft.recipient_name = context.contact.name.to_string();
    }
    if let Some(template) = &template {
        let variables = context
            .as_ref()
            .map(|context| context.variables.clone())
            .unwrap_or_else(|| base_variables(today));
        draft.email_template_id = Some(template.id.get());
        draft.subject = substitute(template.subject.as_str(), &variables);
        draft.body = substitute(template.body.as_str(), &variables);
        draft.unresolved = unresolved_tokens(&draft.subject, &draft.body);
    }

    Ok(ComposePageData {
        templates,
        quotations,
        invoices,
        draft,
    })
}

/// Renders and sends an email, then records the attempt.
///
/// Delivery failures are not errors of this operation: they are stored in
/// the history with status `failed` and reported to the sender through a
/// notification.
pub fn send_email<R>(
    repo: &R,
    storage: &FileStorage,
    sender: &dyn EmailSender,
    user: &AuthenticatedUser,
    form: SendEmailForm,
    now: NaiveDateTime,
) -> ServiceResult<EmailHistory>
where
    R: EmailTemplateReader
        + EmailHistoryWriter
        + QuotationReader
        + InvoiceReader
        + ClientReader
        + CompanySettingsReader
        + NotificationWriter
        + UserWriter
        + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let payload = SendEmailPayload::try_from(form)?;
    if let Some(id) = payload.email_template_id
        && repo.get_email_template_by_id(id)?.is_none()
    {
        return Err(ServiceError::Form("Unknown email template".to_string()));
    }

    let today = now.date();
    let context = payload
        .document
        .map(|document| document_context(repo, document, today))
        .transpose()?;
    let variables = context
        .as_ref()
        .map(|context| context.variables.clone())
        .unwrap_or_else(|| base_variables(today));

    let subject = substitute(&payload.subject, &variables);
    let body = EmailBody::new(substitute(&payload.body, &variables))?;

    let mut attachments = Vec::new();
    if payload.attach_document
        && let Some(file) = context.as_ref().and_then(|context| context.file.as_ref())
    {
        match storage.resolve(&file.path) {
            Ok(path) => attachments.push(path.to_string_lossy().into_owned()),
            Err(err) => log::warn!("Cannot attach {}: {err}", file.path),
        }
    }

    let sender_user = resolve_user(repo, user)?;
    let email = OutgoingEmail {
        recipient_email: payload.recipient_email.clone(),
        recipient_name: payload.recipient_name.clone(),
        subject,
        body: body.into_inner(),
        attachments,
    };

    deliver(
        repo,
        sender,
        sender_user.id,
        email,
        payload.document,
        context.map(|context| context.number),
        payload.email_template_id,
    )
}

/// Hands `email` to the delivery service and records the attempt.
///
/// Delivery failures are stored in the history with status `failed`; the
/// sender is notified either way.
fn deliver<R>(
    repo: &R,
    sender: &dyn EmailSender,
    sent_by: UserId,
    email: OutgoingEmail,
    document: Option<LinkedDocument>,
    document_number: Option<String>,
    email_template_id: Option<EmailTemplateId>,
) -> ServiceResult<EmailHistory>
where
    R: EmailHistoryWriter + NotificationWriter + ?Sized,
{
    let (status, error_message) = match sender.send(&email) {
        Ok(()) => (EmailStatus::Sent, None),
        Err(err) => {
            log::error!("Failed to send email to {}: {err}", email.recipient_email);
            (EmailStatus::Failed, Some(err.to_string()))
        }
    };

    let history = repo.create_email_history(&NewEmailHistory {
        recipient_email: email.recipient_email.clone(),
        recipient_name: email.recipient_name.clone(),
        subject: email.subject.clone(),
        body: email.body,
        document,
        document_number,
        email_template_id,
        status,
        error_message,
        sent_by,
    })?;

    let notification = match status {
        EmailStatus::Sent => NewNotification::new(
            sent_by,
            NotificationType::EmailSent,
            "Email sent",
            format!("\"{}\" was sent to {}", history.subject, history.recipient_email),
        ),
        EmailStatus::Failed => NewNotification::new(
            sent_by,
            NotificationType::EmailFailed,
            "Email failed",
            format!(
                "\"{}\" could not be sent to {}",
                history.subject, history.recipient_email
            ),
        ),
    }
    .related("email", history.id.get());
    if let Err(err) = repo.create_notification(&notification) {
        log::error!("Failed to record notification for email {}: {err}", history.id);
    }

    Ok(history)
}

/// Emails the invoice contact with the default invoice email template once
/// the invoice has been paid.
///
/// Returns `None` without sending when no default invoice template exists.
pub(crate) fn send_invoice_paid_email<R>(
    repo: &R,
    sender: &dyn EmailSender,
    sent_by: UserId,
    invoice: &Invoice,
    now: NaiveDateTime,
) -> ServiceResult<Option<EmailHistory>>
where
    R: EmailTemplateReader
        + EmailHistoryWriter
        + ClientReader
        + CompanySettingsReader
        + NotificationWriter
        + ?Sized,
{
    let (_, templates) = repo.list_email_templates(
        EmailTemplateListQuery::new().template_type(EmailTemplateType::Invoice),
    )?;
    let Some(template) = templates.into_iter().find(|t| t.is_default) else {
        log::info!(
            "No default invoice email template, skipping payment email for {}",
            invoice.invoice_number
        );
        return Ok(None);
    };

    let settings = repo.get_company_settings()?;
    let company = CompanyInfo::from(&settings);
    let client = repo.get_client_by_id(invoice.client_id)?;
    let variables = invoice_variables(invoice, client.as_ref(), Some(&company), now.date());

    let email = OutgoingEmail {
        recipient_email: invoice.selected_contact.email.clone(),
        recipient_name: Some(invoice.selected_contact.name.to_string()),
        subject: substitute(template.subject.as_str(), &variables),
        body: EmailBody::new(substitute(template.body.as_str(), &variables))?.into_inner(),
        attachments: Vec::new(),
    };

    deliver(
        repo,
        sender,
        sent_by,
        email,
        Some(LinkedDocument::Invoice(invoice.id)),
        Some(invoice.invoice_number.clone()),
        Some(template.id),
    )
    .map(Some)
}

pub fn list_email_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<EmailHistoryPageData>
where
    R: EmailHistoryReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let page = query.page();
    let mut list_query = EmailHistoryListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(status) = query.status() {
        list_query = list_query.status(EmailStatus::try_from(status)?);
    }
    let (total, history) = repo.list_email_history(list_query)?;

    Ok(EmailHistoryPageData {
        history: Paginated::new(history, page, total),
        search: query.search().map(str::to_string),
        status: query.status().map(str::to_string),
    })
}

pub fn get_email_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    history_id: i32,
) -> ServiceResult<EmailHistory>
where
    R: EmailHistoryReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    repo.get_email_history_by_id(EmailHistoryId::new(history_id)?)?
        .ok_or(ServiceError::NotFound)
}
