//! Services generating invoices from accepted quotations.

use chrono::NaiveDateTime;

use crate::domain::document::{NumberPrefix, next_document_number};
use crate::domain::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::domain::quotation::QuotationStatus;
use crate::domain::template::TemplateType;
use crate::domain::types::InvoiceId;
use crate::dto::invoices::{InvoicePageData, InvoiceRow, InvoicesPageData};
use crate::dto::{DOCX_MIME_TYPE, FileDownload, GeneratedDocument, ListQuery};
use crate::forms::invoices::{
    InvoiceForm, InvoiceUpdateForm, InvoiceUpdatePayload, ensure_future_due_date,
};
use crate::forms::start_of_day;
use crate::guard::{check_role, ensure_role};
use crate::mailer::EmailSender;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::EditorConfig;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::placeholders::invoice_variables;
use crate::repository::{
    ClientReader, CompanySettingsReader, EmailHistoryWriter, EmailTemplateReader,
    InvoiceListQuery, InvoiceReader, InvoiceWriter, NotificationWriter, QuotationListQuery,
    QuotationReader, TemplateReader, UserWriter,
};
use crate::services::emails::send_invoice_paid_email;
use crate::services::quotations::{client_names, company_snapshot};
use crate::services::templates::{
    load_template, render_document, stored_placeholders, usable_templates,
};
use crate::services::users::resolve_user;
use crate::services::{ServiceError, ServiceResult, storage_failure};
use crate::storage::{FileStorage, Folder};
use crate::{ADMIN_ROLES, ALL_ROLES};

pub(crate) fn load_invoice<R>(repo: &R, invoice_id: i32) -> ServiceResult<Invoice>
where
    R: InvoiceReader + ?Sized,
{
    repo.get_invoice_by_id(InvoiceId::new(invoice_id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Invoices are visible to every role; only admins may manage them.
pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<InvoicesPageData>
where
    R: InvoiceReader + QuotationReader + ClientReader + TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;
    let can_manage = check_role(user.role_id, ADMIN_ROLES);

    let page = query.page();
    let mut list_query = InvoiceListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(status) = query.status() {
        list_query = list_query.status(InvoiceStatus::try_from(status)?);
    }
    let (total, invoices) = repo.list_invoices(list_query)?;

    let names = client_names(repo, invoices.iter().map(|i| i.client_id))?;
    let rows = invoices
        .into_iter()
        .map(|invoice| InvoiceRow {
            client_name: names.get(&invoice.client_id).cloned(),
            invoice,
        })
        .collect();

    let (quotations, templates) = if can_manage {
        let (_, accepted) = repo
            .list_quotations(QuotationListQuery::new().status(QuotationStatus::Accepted))?;
        (accepted, usable_templates(repo, TemplateType::Invoice)?)
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(InvoicesPageData {
        invoices: Paginated::new(rows, page, total),
        quotations,
        templates,
        can_manage,
        search: query.search().map(str::to_string),
        status: query.status().map(str::to_string),
    })
}

pub fn get_invoice<R>(
    repo: &R,
    storage: &FileStorage,
    editor: &EditorConfig,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<InvoicePageData>
where
    R: InvoiceReader + QuotationReader + ClientReader + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;

    let invoice = load_invoice(repo, invoice_id)?;
    let client = repo.get_client_by_id(invoice.client_id)?;
    let quotation = repo.get_quotation_by_id(invoice.quotation_id)?;
    let unfilled = stored_placeholders(storage, invoice.file.as_ref());

    Ok(InvoicePageData {
        invoice,
        client,
        quotation,
        can_manage: check_role(user.role_id, ADMIN_ROLES),
        unfilled,
        editor_script_url: editor.script_url(),
    })
}

/// Creates an invoice for an accepted quotation and fills the template file
/// as its document.
///
/// The due date, when given, must fall after the day of `now`; the check
/// runs before anything is read or written. Without one the quotation's due
/// date is carried over.
pub fn generate_invoice<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    form: InvoiceForm,
    now: NaiveDateTime,
) -> ServiceResult<GeneratedDocument<Invoice>>
where
    R: InvoiceReader
        + InvoiceWriter
        + QuotationReader
        + ClientReader
        + TemplateReader
        + CompanySettingsReader
        + UserWriter
        + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let today = now.date();
    let payload = form.into_payload(today)?;

    let quotation = repo
        .get_quotation_by_id(payload.quotation_id)?
        .ok_or_else(|| ServiceError::Form("Unknown quotation".to_string()))?;
    if quotation.status != QuotationStatus::Accepted {
        return Err(ServiceError::Form(
            "Only accepted quotations can be invoiced".to_string(),
        ));
    }

    let template = load_template(repo, payload.template_id.get())?;
    let template_file = template
        .usable_file(TemplateType::Invoice)
        .cloned()
        .ok_or_else(|| ServiceError::Form("The template has no invoice document".to_string()))?;

    let prefix = NumberPrefix::Invoice.for_year(today);
    let latest = repo.latest_invoice_number(&prefix)?;
    let invoice_number = next_document_number(NumberPrefix::Invoice, today, latest.as_deref())?;

    let creator = resolve_user(repo, user)?;
    let my_company_info = match quotation.my_company_info.clone() {
        Some(info) => Some(info),
        None => company_snapshot(repo)?,
    };
    let new_invoice = NewInvoice {
        invoice_number,
        quotation_id: quotation.id,
        client_id: quotation.client_id,
        selected_contact: quotation.selected_contact.clone(),
        template_id: template.id,
        my_company_info,
        due_date: payload.due_date.map(start_of_day).or(quotation.due_date),
        created_by: creator.id,
    };
    let invoice = repo.create_invoice(&new_invoice)?;

    let document_name = format!("{}.docx", invoice.invoice_number);
    let client = repo.get_client_by_id(invoice.client_id)?;
    let variables = invoice_variables(&invoice, client.as_ref(), None, today);
    let (file, unfilled) = match render_document(
        storage,
        &template_file,
        Folder::Invoices,
        &document_name,
        &variables,
    ) {
        Ok(rendered) => rendered,
        Err(err) => {
            if let Err(cleanup) = repo.delete_invoice(invoice.id) {
                log::error!("Failed to remove invoice {}: {cleanup}", invoice.id);
            }
            return Err(err);
        }
    };

    let invoice = repo.set_invoice_file(invoice.id, &file).inspect_err(|_| {
        storage.discard(&file);
    })?;
    log::info!(
        "Invoice {} generated from {} by {}",
        invoice.invoice_number,
        quotation.quotation_number,
        user.email
    );
    Ok(GeneratedDocument {
        record: invoice,
        unfilled,
    })
}

/// Changes an invoice's status or due date.
///
/// Only a due date that differs from the stored one has to lie in the
/// future, so overdue invoices can still be settled. Moving the invoice to
/// paid emails the client unless the form opted out; a failed email does not
/// undo the update.
pub fn update_invoice<R>(
    repo: &R,
    sender: &dyn EmailSender,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: InvoiceUpdateForm,
    now: NaiveDateTime,
) -> ServiceResult<Invoice>
where
    R: InvoiceReader
        + InvoiceWriter
        + ClientReader
        + CompanySettingsReader
        + EmailTemplateReader
        + EmailHistoryWriter
        + NotificationWriter
        + UserWriter
        + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let invoice = load_invoice(repo, invoice_id)?;
    let payload = InvoiceUpdatePayload::try_from(form)?;
    ensure_future_due_date(&payload.update, invoice.due_date, now.date())?;

    let updated = repo.update_invoice(invoice.id, &payload.update)?;

    let became_paid =
        invoice.status != InvoiceStatus::Paid && updated.status == InvoiceStatus::Paid;
    if became_paid && payload.send_notification_email {
        let sent = resolve_user(repo, user)
            .and_then(|sent_by| send_invoice_paid_email(repo, sender, sent_by.id, &updated, now));
        if let Err(err) = sent {
            log::error!(
                "Failed to email payment of invoice {}: {err}",
                updated.invoice_number
            );
        }
    }
    Ok(updated)
}

pub fn delete_invoice<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<()>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let invoice = load_invoice(repo, invoice_id)?;
    repo.delete_invoice(invoice.id)?;
    if let Some(file) = &invoice.file {
        storage.discard(file);
    }
    Ok(())
}

pub fn invoice_download<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<FileDownload>
where
    R: InvoiceReader + ?Sized,
{
    ensure_role(user.role_id, ALL_ROLES)?;

    let invoice = load_invoice(repo, invoice_id)?;
    let file = invoice.file.ok_or(ServiceError::NotFound)?;

    Ok(FileDownload {
        path: storage
            .resolve(&file.path)
            .map_err(storage_failure("locate file"))?,
        name: file.name,
        mime_type: DOCX_MIME_TYPE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::{Client, Contact};
    use crate::domain::company::CompanySettings;
    use crate::domain::document::StoredFile;
    use crate::domain::email::{
        EmailHistory, EmailStatus, EmailTemplate, EmailTemplateType, NewEmailHistory,
    };
    use crate::domain::quotation::Quotation;
    use crate::domain::role::Role;
    use crate::domain::template::{Template, TemplateStatus};
    use crate::domain::types::{
        ClientId, CompanyName, ContactEmail, EmailBody, EmailHistoryId, EmailSubject,
        EmailTemplateId, PersonName, QuotationId, TemplateId, TemplateName, UserEmail, UserId,
    };
    use crate::domain::user::User;
    use crate::mailer::MockEmailSender;
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    fn auth(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role_id: role.id(),
            exp: 0,
        }
    }

    fn quotation(status: QuotationStatus) -> Quotation {
        Quotation {
            id: QuotationId::new(5).unwrap(),
            quotation_number: "Q-2025-0005".into(),
            client_id: ClientId::new(3).unwrap(),
            selected_contact: Contact {
                name: PersonName::new("Jane").unwrap(),
                email: ContactEmail::new("jane@acme.com").unwrap(),
                phone: None,
            },
            template_id: TemplateId::new(1).unwrap(),
            my_company_info: None,
            file: None,
            due_date: None,
            status,
            created_by: UserId::new(1).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn form(due_date: &str) -> InvoiceForm {
        InvoiceForm {
            quotation_id: 5,
            template_id: 2,
            due_date: Some(due_date.into()),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).map(start_of_day)
    }

    fn invoice(status: InvoiceStatus, due_date: Option<NaiveDateTime>) -> Invoice {
        Invoice {
            id: InvoiceId::new(8).unwrap(),
            invoice_number: "INV-2025-0003".into(),
            quotation_id: QuotationId::new(5).unwrap(),
            client_id: ClientId::new(3).unwrap(),
            selected_contact: quotation(QuotationStatus::Accepted).selected_contact,
            template_id: TemplateId::new(2).unwrap(),
            my_company_info: None,
            file: None,
            due_date,
            status,
            created_by: UserId::new(1).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn invoice_from(new: &NewInvoice) -> Invoice {
        Invoice {
            invoice_number: new.invoice_number.clone(),
            due_date: new.due_date,
            ..invoice(InvoiceStatus::Unpaid, None)
        }
    }

    fn client() -> Client {
        Client {
            id: ClientId::new(3).unwrap(),
            company_name: CompanyName::new("Acme").unwrap(),
            uen: None,
            industry: None,
            address: None,
            postal_code: None,
            contacts: vec![quotation(QuotationStatus::Accepted).selected_contact],
            partner_id: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn expect_user(repo: &mut MockRepository) {
        repo.expect_sync_user().returning(|new_user| {
            Ok(User {
                id: UserId::new(1).unwrap(),
                name: new_user.name.clone(),
                email: UserEmail::new(new_user.email.as_str()).unwrap(),
                role: new_user.role,
                created_at: now(),
                updated_at: now(),
            })
        });
    }

    fn paid_template() -> EmailTemplate {
        EmailTemplate {
            id: EmailTemplateId::new(6).unwrap(),
            name: TemplateName::new("Payment received").unwrap(),
            subject: EmailSubject::new("Invoice {{invoice_number}} paid").unwrap(),
            body: EmailBody::new("<p>Thank you, {{contact_name}}.</p>").unwrap(),
            template_type: EmailTemplateType::Invoice,
            variables: vec!["invoice_number".into(), "contact_name".into()],
            is_default: true,
            created_by: UserId::new(1).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn history_from(new: &NewEmailHistory) -> EmailHistory {
        EmailHistory {
            id: EmailHistoryId::new(2).unwrap(),
            recipient_email: new.recipient_email.to_string(),
            recipient_name: new.recipient_name.clone(),
            subject: new.subject.clone(),
            body: new.body.clone(),
            quotation_id: None,
            invoice_id: Some(InvoiceId::new(8).unwrap()),
            document_number: new.document_number.clone(),
            document_type: None,
            email_template_id: new.email_template_id,
            status: new.status,
            error_message: new.error_message.clone(),
            sent_by: new.sent_by,
            sent_at: now(),
        }
    }

    fn mark_paid(due_date: &str, notify: bool) -> InvoiceUpdateForm {
        InvoiceUpdateForm {
            status: "paid".into(),
            due_date: Some(due_date.into()),
            send_notification_email: notify.then(|| "on".to_string()),
        }
    }

    #[test]
    fn overdue_invoice_can_be_marked_paid_and_emails_the_client() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|_| Ok(Some(invoice(InvoiceStatus::Unpaid, day(2025, 6, 1)))));
        repo.expect_update_invoice()
            .withf(|_, update| {
                update.status == InvoiceStatus::Paid && update.due_date == day(2025, 6, 1)
            })
            .times(1)
            .returning(|_, update| Ok(invoice(update.status, update.due_date)));
        expect_user(&mut repo);
        repo.expect_list_email_templates()
            .returning(|_| Ok((1, vec![paid_template()])));
        repo.expect_get_company_settings()
            .returning(|| Ok(CompanySettings::default()));
        repo.expect_get_client_by_id().returning(|_| Ok(Some(client())));
        repo.expect_create_email_history()
            .withf(|new| {
                new.subject == "Invoice INV-2025-0003 paid"
                    && new.document_number.as_deref() == Some("INV-2025-0003")
                    && new.email_template_id == EmailTemplateId::new(6).ok()
                    && new.status == EmailStatus::Sent
            })
            .times(1)
            .returning(|new| Ok(history_from(new)));
        repo.expect_create_notification()
            .returning(|_| Err(crate::repository::errors::RepositoryError::NotFound));

        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .withf(|email| {
                email.recipient_email.as_str() == "jane@acme.com"
                    && email.body == "<p>Thank you, Jane.</p>"
            })
            .times(1)
            .returning(|_| Ok(()));

        let updated = update_invoice(
            &repo,
            &sender,
            &auth(Role::Admin),
            8,
            mark_paid("2025-06-01", true),
            now(),
        )
        .unwrap();
        assert_eq!(updated.status, InvoiceStatus::Paid);
    }

    #[test]
    fn payment_email_can_be_skipped() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|_| Ok(Some(invoice(InvoiceStatus::Unpaid, day(2025, 7, 1)))));
        repo.expect_update_invoice()
            .returning(|_, update| Ok(invoice(update.status, update.due_date)));
        repo.expect_create_email_history().never();
        let mut sender = MockEmailSender::new();
        sender.expect_send().never();

        let updated = update_invoice(
            &repo,
            &sender,
            &auth(Role::Admin),
            8,
            mark_paid("2025-07-01", false),
            now(),
        )
        .unwrap();
        assert_eq!(updated.status, InvoiceStatus::Paid);
    }

    #[test]
    fn moving_the_due_date_into_the_past_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(|_| Ok(Some(invoice(InvoiceStatus::Unpaid, day(2025, 7, 1)))));
        repo.expect_update_invoice().never();
        let mut sender = MockEmailSender::new();
        sender.expect_send().never();

        let result = update_invoice(
            &repo,
            &sender,
            &auth(Role::Admin),
            8,
            mark_paid("2025-06-01", true),
            now(),
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn generated_invoice_takes_the_quotation_due_date_and_fills_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let template_document = crate::docx::tests::build(&[(
            "word/document.xml",
            "<w:t>{{invoice_number}} due {{due_date}} for {{client_company_name}} {{client_uen}}</w:t>",
        )]);
        let stored = storage
            .save_bytes(Folder::Templates, &template_document, "invoice.docx")
            .unwrap();

        let mut repo = MockRepository::new();
        repo.expect_get_quotation_by_id().returning(|_| {
            Ok(Some(Quotation {
                due_date: day(2025, 7, 15),
                ..quotation(QuotationStatus::Accepted)
            }))
        });
        repo.expect_get_template_by_id().returning(move |_| {
            Ok(Some(Template {
                id: TemplateId::new(2).unwrap(),
                name: TemplateName::new("Invoice").unwrap(),
                description: None,
                template_type: TemplateType::Invoice,
                file: Some(StoredFile {
                    path: stored.path.clone(),
                    name: "invoice.docx".into(),
                    size: 3,
                }),
                status: TemplateStatus::Saved,
                created_by: UserId::new(1).unwrap(),
                created_at: now(),
                updated_at: now(),
            }))
        });
        repo.expect_latest_invoice_number()
            .withf(|prefix| prefix == "INV-2025-")
            .returning(|_| Ok(Some("INV-2025-0002".into())));
        expect_user(&mut repo);
        repo.expect_get_company_settings()
            .returning(|| Ok(CompanySettings::default()));
        repo.expect_create_invoice()
            .withf(|new| new.invoice_number == "INV-2025-0003" && new.due_date == day(2025, 7, 15))
            .times(1)
            .returning(|new| Ok(invoice_from(new)));
        repo.expect_get_client_by_id().returning(|_| Ok(Some(client())));
        repo.expect_set_invoice_file()
            .withf(|_, file| file.path.starts_with("invoices/"))
            .returning(|_, file| {
                Ok(Invoice {
                    file: Some(file.clone()),
                    ..invoice(InvoiceStatus::Unpaid, day(2025, 7, 15))
                })
            });

        let form = InvoiceForm {
            quotation_id: 5,
            template_id: 2,
            due_date: Some("".into()),
        };
        let generated =
            generate_invoice(&repo, &storage, &auth(Role::Admin), form, now()).unwrap();

        let file = generated.record.file.unwrap();
        let bytes = storage.read(&file).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("word/document.xml").unwrap(),
            &mut text,
        )
        .unwrap();
        assert_eq!(text, "<w:t>INV-2025-0003 due 15/07/2025 for Acme {{client_uen}}</w:t>");
        assert_eq!(generated.unfilled, vec!["client_uen"]);
    }

    #[test]
    fn due_date_of_today_is_rejected_before_persistence() {
        let mut repo = MockRepository::new();
        repo.expect_get_quotation_by_id().never();
        repo.expect_create_invoice().never();
        let storage = FileStorage::new("/tmp/opsdesk-test");

        let result = generate_invoice(&repo, &storage, &auth(Role::Admin), form("2025-06-10"), now());
        match result {
            Err(ServiceError::Form(message)) => assert!(message.contains("after today")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn pending_quotations_cannot_be_invoiced() {
        let mut repo = MockRepository::new();
        repo.expect_get_quotation_by_id()
            .returning(|_| Ok(Some(quotation(QuotationStatus::Pending))));
        repo.expect_create_invoice().never();
        let storage = FileStorage::new("/tmp/opsdesk-test");

        let result = generate_invoice(&repo, &storage, &auth(Role::Admin), form("2025-07-01"), now());
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn plain_users_see_invoices_without_management() {
        let mut repo = MockRepository::new();
        repo.expect_list_invoices().returning(|_| Ok((0, vec![])));
        repo.expect_list_quotations().never();

        let data = list_invoices(&repo, &auth(Role::User), &ListQuery::default()).unwrap();
        assert!(!data.can_manage);
        assert!(data.quotations.is_empty());
    }

    #[test]
    fn plain_users_cannot_generate_invoices() {
        let repo = MockRepository::new();
        let storage = FileStorage::new("/tmp/opsdesk-test");
        let result = generate_invoice(&repo, &storage, &auth(Role::User), form("2025-07-01"), now());
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }
}
