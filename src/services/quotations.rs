//! Services generating and managing quotations.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::ADMIN_ROLES;
use crate::domain::client::Client;
use crate::domain::company::CompanyInfo;
use crate::domain::document::{NumberPrefix, next_document_number};
use crate::domain::quotation::{NewQuotation, Quotation, QuotationStatus, UpdateQuotation};
use crate::domain::template::TemplateType;
use crate::domain::types::{ClientId, QuotationId};
use crate::dto::quotations::{QuotationPageData, QuotationRow, QuotationsPageData};
use crate::dto::{DOCX_MIME_TYPE, FileDownload, GeneratedDocument, ListQuery};
use crate::forms::quotations::{QuotationForm, QuotationPayload, QuotationUpdateForm};
use crate::forms::start_of_day;
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::EditorConfig;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::placeholders::quotation_variables;
use crate::repository::{
    ClientListQuery, ClientReader, CompanySettingsReader, InvoiceReader, QuotationListQuery,
    QuotationReader, QuotationWriter, TemplateReader, UserWriter,
};
use crate::services::templates::{
    load_template, render_document, stored_placeholders, usable_templates,
};
use crate::services::users::resolve_user;
use crate::services::{ServiceError, ServiceResult, storage_failure};
use crate::storage::{FileStorage, Folder};

pub(crate) fn load_quotation<R>(repo: &R, quotation_id: i32) -> ServiceResult<Quotation>
where
    R: QuotationReader + ?Sized,
{
    repo.get_quotation_by_id(QuotationId::new(quotation_id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Resolves client names for a page of documents, one lookup per client.
pub(crate) fn client_names<R>(
    repo: &R,
    ids: impl IntoIterator<Item = ClientId>,
) -> ServiceResult<BTreeMap<ClientId, String>>
where
    R: ClientReader + ?Sized,
{
    let mut names = BTreeMap::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        if let Some(client) = repo.get_client_by_id(id)? {
            names.insert(id, client.company_name.into_inner());
        }
    }
    Ok(names)
}

/// Current company settings as the snapshot stored on new documents.
pub(crate) fn company_snapshot<R>(repo: &R) -> ServiceResult<Option<CompanyInfo>>
where
    R: CompanySettingsReader + ?Sized,
{
    let settings = repo.get_company_settings()?;
    let info = CompanyInfo::from(&settings);
    Ok((info != CompanyInfo::default()).then_some(info))
}

pub fn list_quotations<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<QuotationsPageData>
where
    R: QuotationReader + ClientReader + TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let page = query.page();
    let mut list_query = QuotationListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(status) = query.status() {
        list_query = list_query.status(QuotationStatus::try_from(status)?);
    }
    let (total, quotations) = repo.list_quotations(list_query)?;

    let names = client_names(repo, quotations.iter().map(|q| q.client_id))?;
    let rows = quotations
        .into_iter()
        .map(|quotation| QuotationRow {
            client_name: names.get(&quotation.client_id).cloned(),
            quotation,
        })
        .collect();

    let (_, clients) = repo.list_clients(ClientListQuery::new())?;

    Ok(QuotationsPageData {
        quotations: Paginated::new(rows, page, total),
        clients,
        templates: usable_templates(repo, TemplateType::Quotation)?,
        search: query.search().map(str::to_string),
        status: query.status().map(str::to_string),
    })
}

pub fn get_quotation<R>(
    repo: &R,
    storage: &FileStorage,
    editor: &EditorConfig,
    user: &AuthenticatedUser,
    quotation_id: i32,
) -> ServiceResult<QuotationPageData>
where
    R: QuotationReader + ClientReader + InvoiceReader + TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let quotation = load_quotation(repo, quotation_id)?;
    let client = repo.get_client_by_id(quotation.client_id)?;
    let invoices = repo.list_invoices_for_quotation(quotation.id)?;
    let invoice_templates = if quotation.status == QuotationStatus::Accepted {
        usable_templates(repo, TemplateType::Invoice)?
    } else {
        Vec::new()
    };

    let unfilled = stored_placeholders(storage, quotation.file.as_ref());

    Ok(QuotationPageData {
        quotation,
        client,
        invoices,
        invoice_templates,
        unfilled,
        editor_script_url: editor.script_url(),
    })
}

fn selected_client<R>(repo: &R, payload: &QuotationPayload) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    repo.get_client_by_id(payload.client_id)?
        .ok_or_else(|| ServiceError::Form("Unknown client".to_string()))
}

/// Creates a quotation for a client contact and fills the template file with
/// the client, contact and company details as its document.
pub fn generate_quotation<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    form: QuotationForm,
    now: NaiveDateTime,
) -> ServiceResult<GeneratedDocument<Quotation>>
where
    R: QuotationReader
        + QuotationWriter
        + ClientReader
        + TemplateReader
        + CompanySettingsReader
        + UserWriter
        + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let payload = QuotationPayload::try_from(form)?;
    let client = selected_client(repo, &payload)?;
    let contact = client
        .contact(payload.contact_index)
        .cloned()
        .ok_or_else(|| ServiceError::Form("Select one of the client's contacts".to_string()))?;

    let template = load_template(repo, payload.template_id.get())?;
    let template_file = template
        .usable_file(TemplateType::Quotation)
        .cloned()
        .ok_or_else(|| {
            ServiceError::Form("The template has no quotation document".to_string())
        })?;

    let today = now.date();
    let prefix = NumberPrefix::Quotation.for_year(today);
    let latest = repo.latest_quotation_number(&prefix)?;
    let quotation_number =
        next_document_number(NumberPrefix::Quotation, today, latest.as_deref())?;

    let creator = resolve_user(repo, user)?;
    let new_quotation = NewQuotation {
        quotation_number,
        client_id: client.id,
        selected_contact: contact,
        template_id: template.id,
        my_company_info: company_snapshot(repo)?,
        due_date: payload.due_date.map(start_of_day),
        created_by: creator.id,
    };
    let quotation = repo.create_quotation(&new_quotation)?;

    let document_name = format!("{}.docx", quotation.quotation_number);
    let variables = quotation_variables(&quotation, Some(&client), None, today);
    let (file, unfilled) = match render_document(
        storage,
        &template_file,
        Folder::Quotations,
        &document_name,
        &variables,
    ) {
        Ok(rendered) => rendered,
        Err(err) => {
            if let Err(cleanup) = repo.delete_quotation(quotation.id) {
                log::error!("Failed to remove quotation {}: {cleanup}", quotation.id);
            }
            return Err(err);
        }
    };

    let quotation = repo.set_quotation_file(quotation.id, &file).inspect_err(|_| {
        storage.discard(&file);
    })?;
    log::info!(
        "Quotation {} generated by {}",
        quotation.quotation_number,
        user.email
    );
    Ok(GeneratedDocument {
        record: quotation,
        unfilled,
    })
}

pub fn update_quotation<R>(
    repo: &R,
    user: &AuthenticatedUser,
    quotation_id: i32,
    form: QuotationUpdateForm,
) -> ServiceResult<Quotation>
where
    R: QuotationReader + QuotationWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let quotation = load_quotation(repo, quotation_id)?;
    let updates = UpdateQuotation::try_from(form)?;

    Ok(repo.update_quotation(quotation.id, &updates)?)
}

/// Deletes a quotation that has not been invoiced yet.
pub fn delete_quotation<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    quotation_id: i32,
) -> ServiceResult<()>
where
    R: QuotationReader + QuotationWriter + InvoiceReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let quotation = load_quotation(repo, quotation_id)?;
    if !repo.list_invoices_for_quotation(quotation.id)?.is_empty() {
        return Err(ServiceError::Conflict(format!(
            "Quotation {} has invoices and cannot be deleted",
            quotation.quotation_number
        )));
    }

    repo.delete_quotation(quotation.id)?;
    if let Some(file) = &quotation.file {
        storage.discard(file);
    }
    Ok(())
}

pub fn quotation_download<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    quotation_id: i32,
) -> ServiceResult<FileDownload>
where
    R: QuotationReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let quotation = load_quotation(repo, quotation_id)?;
    let file = quotation.file.ok_or(ServiceError::NotFound)?;

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
    use crate::domain::client::Contact;
    use crate::domain::company::CompanySettings;
    use crate::domain::document::StoredFile;
    use crate::domain::invoice::{Invoice, InvoiceStatus};
    use crate::domain::role::Role;
    use crate::domain::template::{Template, TemplateStatus};
    use crate::domain::types::{
        CompanyName, ContactEmail, InvoiceId, PersonName, TemplateId, TemplateName, UserEmail,
        UserId,
    };
    use crate::domain::user::User;
    use crate::repository::mock::MockRepository;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn auth() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role_id: Role::Admin.id(),
            exp: 0,
        }
    }

    fn contact() -> Contact {
        Contact {
            name: PersonName::new("Jane").unwrap(),
            email: ContactEmail::new("jane@acme.com").unwrap(),
            phone: None,
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
            contacts: vec![contact()],
            partner_id: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn template(path: &str) -> Template {
        Template {
            id: TemplateId::new(2).unwrap(),
            name: TemplateName::new("Standard").unwrap(),
            description: None,
            template_type: TemplateType::Quotation,
            file: Some(StoredFile {
                path: path.into(),
                name: "standard.docx".into(),
                size: 3,
            }),
            status: TemplateStatus::Saved,
            created_by: UserId::new(1).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn quotation_from(new: &NewQuotation) -> Quotation {
        Quotation {
            id: QuotationId::new(11).unwrap(),
            quotation_number: new.quotation_number.clone(),
            client_id: new.client_id,
            selected_contact: new.selected_contact.clone(),
            template_id: new.template_id,
            my_company_info: new.my_company_info.clone(),
            file: None,
            due_date: new.due_date,
            status: QuotationStatus::Pending,
            created_by: new.created_by,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            id: InvoiceId::new(4).unwrap(),
            invoice_number: "INV-2025-0001".into(),
            quotation_id: QuotationId::new(11).unwrap(),
            client_id: ClientId::new(3).unwrap(),
            selected_contact: contact(),
            template_id: TemplateId::new(2).unwrap(),
            my_company_info: None,
            file: None,
            due_date: None,
            status: InvoiceStatus::Unpaid,
            created_by: UserId::new(1).unwrap(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn form(contact_index: usize) -> QuotationForm {
        QuotationForm {
            client_id: 3,
            contact_index,
            template_id: 2,
            due_date: Some("2025-07-01".into()),
        }
    }

    #[test]
    fn contact_index_must_exist() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(Some(client())));
        repo.expect_create_quotation().never();
        let storage = FileStorage::new("/tmp/opsdesk-test");

        let result = generate_quotation(&repo, &storage, &auth(), form(4), now());
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    fn document_text(storage: &FileStorage, file: &StoredFile) -> String {
        use std::io::Read;

        let bytes = storage.read(file).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn generated_quotation_gets_next_number_and_filled_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let template_document = crate::docx::tests::build(&[(
            "word/document.xml",
            "<w:t>{{quotation_number}} for {{client_company_name}}, {{contact_name}} {{contact_phone}}</w:t>",
        )]);
        let stored = storage
            .save_bytes(Folder::Templates, &template_document, "standard.docx")
            .unwrap();
        let template_path = stored.path.clone();

        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(Some(client())));
        repo.expect_get_template_by_id()
            .returning(move |_| Ok(Some(template(&template_path))));
        repo.expect_latest_quotation_number()
            .withf(|prefix| prefix == "Q-2025-")
            .returning(|_| Ok(Some("Q-2025-0007".into())));
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
        repo.expect_get_company_settings().returning(|| {
            Ok(CompanySettings {
                company_name: Some("Opsdesk Pte Ltd".into()),
                ..CompanySettings::default()
            })
        });
        repo.expect_create_quotation()
            .withf(|new| {
                new.quotation_number == "Q-2025-0008"
                    && new.selected_contact.email.as_str() == "jane@acme.com"
                    && new.my_company_info.as_ref().map(|c| c.name.as_str())
                        == Some("Opsdesk Pte Ltd")
            })
            .returning(|new| Ok(quotation_from(new)));
        repo.expect_set_quotation_file()
            .withf(|_, file| file.name == "Q-2025-0008.docx" && file.path.starts_with("quotations/"))
            .returning(|_, file| {
                let mut quotation = quotation_from(&NewQuotation {
                    quotation_number: "Q-2025-0008".into(),
                    client_id: ClientId::new(3).unwrap(),
                    selected_contact: contact(),
                    template_id: TemplateId::new(2).unwrap(),
                    my_company_info: None,
                    due_date: None,
                    created_by: UserId::new(1).unwrap(),
                });
                quotation.file = Some(file.clone());
                Ok(quotation)
            });

        let generated = generate_quotation(&repo, &storage, &auth(), form(0), now()).unwrap();
        let file = generated.record.file.unwrap();
        assert_eq!(
            document_text(&storage, &file),
            "<w:t>Q-2025-0008 for Acme, Jane {{contact_phone}}</w:t>"
        );
        assert_eq!(generated.unfilled, vec!["contact_phone"]);
    }

    #[test]
    fn invalid_template_document_removes_the_quotation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let stored = storage
            .save_bytes(Folder::Templates, b"not a document", "standard.docx")
            .unwrap();
        let template_path = stored.path.clone();

        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_| Ok(Some(client())));
        repo.expect_get_template_by_id()
            .returning(move |_| Ok(Some(template(&template_path))));
        repo.expect_latest_quotation_number().returning(|_| Ok(None));
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
        repo.expect_get_company_settings()
            .returning(|| Ok(CompanySettings::default()));
        repo.expect_create_quotation()
            .returning(|new| Ok(quotation_from(new)));
        repo.expect_delete_quotation().times(1).returning(|_| Ok(()));
        repo.expect_set_quotation_file().never();

        let result = generate_quotation(&repo, &storage, &auth(), form(0), now());
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn invoiced_quotation_cannot_be_deleted() {
        let mut repo = MockRepository::new();
        repo.expect_get_quotation_by_id().returning(|_| {
            Ok(Some(quotation_from(&NewQuotation {
                quotation_number: "Q-2025-0001".into(),
                client_id: ClientId::new(3).unwrap(),
                selected_contact: contact(),
                template_id: TemplateId::new(2).unwrap(),
                my_company_info: None,
                due_date: None,
                created_by: UserId::new(1).unwrap(),
            })))
        });
        repo.expect_list_invoices_for_quotation()
            .returning(|_| Ok(vec![invoice()]));
        repo.expect_delete_quotation().never();
        let storage = FileStorage::new("/tmp/opsdesk-test");

        let result = delete_quotation(&repo, &storage, &auth(), 11);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
