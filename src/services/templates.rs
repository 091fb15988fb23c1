//! Services managing DOCX document templates.

use crate::ADMIN_ROLES;
use crate::docx::{self, DocxError};
use crate::domain::document::StoredFile;
use crate::domain::template::{Template, TemplateType, UpdateTemplate};
use crate::domain::types::TemplateId;
use crate::dto::templates::{TemplatePageData, TemplatesPageData};
use crate::dto::{DOCX_MIME_TYPE, FileDownload, ListQuery};
use crate::forms::FormError;
use crate::forms::templates::{ReplaceTemplateFileForm, TemplateForm, UploadTemplateForm};
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::EditorConfig;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::placeholders::Variables;
use crate::repository::{TemplateListQuery, TemplateReader, TemplateWriter, UserWriter};
use crate::services::users::resolve_user;
use crate::services::{ServiceError, ServiceResult, delete_conflict, storage_failure};
use crate::storage::{FileStorage, Folder};

pub(crate) fn load_template<R>(repo: &R, template_id: i32) -> ServiceResult<Template>
where
    R: TemplateReader + ?Sized,
{
    repo.get_template_by_id(TemplateId::new(template_id)?)?
        .ok_or(ServiceError::NotFound)
}

/// Fills a template document with `variables` and stores the result in
/// `folder` as `name`. Returns the stored file and the placeholders left
/// unfilled.
pub(crate) fn render_document(
    storage: &FileStorage,
    template_file: &StoredFile,
    folder: Folder,
    name: &str,
    variables: &Variables,
) -> ServiceResult<(StoredFile, Vec<String>)> {
    let bytes = storage
        .read(template_file)
        .map_err(storage_failure("read template"))?;
    let filled = docx::fill(&bytes, variables).map_err(|err| {
        log::error!("Failed to fill {}: {err}", template_file.path);
        ServiceError::Form("The template file is not a valid DOCX document".to_string())
    })?;
    let file = storage
        .save_bytes(folder, &filled.bytes, name)
        .map_err(storage_failure("store document"))?;
    Ok((file, filled.unfilled))
}

/// Placeholders present in a stored document. Unreadable files report none.
pub(crate) fn stored_placeholders(storage: &FileStorage, file: Option<&StoredFile>) -> Vec<String> {
    let Some(file) = file else {
        return Vec::new();
    };
    let result = storage
        .read(file)
        .map_err(DocxError::from)
        .and_then(|bytes| docx::placeholders(&bytes));
    match result {
        Ok(names) => names,
        Err(err) => {
            log::warn!("Cannot inspect placeholders of {}: {err}", file.path);
            Vec::new()
        }
    }
}

/// Templates of `kind` that have a stored file and can produce documents.
pub(crate) fn usable_templates<R>(repo: &R, kind: TemplateType) -> ServiceResult<Vec<Template>>
where
    R: TemplateReader + ?Sized,
{
    let (_, templates) = repo.list_templates(TemplateListQuery::new().template_type(kind))?;
    Ok(templates
        .into_iter()
        .filter(|template| template.usable_file(kind).is_some())
        .collect())
}

pub fn list_templates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: &ListQuery,
) -> ServiceResult<TemplatesPageData>
where
    R: TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let page = query.page();
    let mut list_query = TemplateListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(search) = query.search() {
        list_query = list_query.search(search);
    }
    if let Some(kind) = query.template_type() {
        list_query = list_query.template_type(TemplateType::try_from(kind)?);
    }
    let (total, templates) = repo.list_templates(list_query)?;

    Ok(TemplatesPageData {
        templates: Paginated::new(templates, page, total),
        search: query.search().map(str::to_string),
        template_type: query.template_type().map(str::to_string),
    })
}

pub fn get_template<R>(
    repo: &R,
    storage: &FileStorage,
    editor: &EditorConfig,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<TemplatePageData>
where
    R: TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_template(repo, template_id)?;
    let placeholders = stored_placeholders(storage, template.file.as_ref());

    Ok(TemplatePageData {
        template,
        placeholders,
        editor_script_url: editor.script_url(),
    })
}

/// Creates a template from an uploaded DOCX file.
pub fn upload_template<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    form: &UploadTemplateForm,
) -> ServiceResult<Template>
where
    R: TemplateWriter + UserWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let creator = resolve_user(repo, user)?;
    let (new_template, file_name) = form.to_new_template(creator.id)?;

    let file = storage
        .save_upload(Folder::Templates, form.file.file.path(), &file_name)
        .map_err(storage_failure("store template"))?;

    let template = repo.create_template(&new_template).inspect_err(|_| {
        storage.discard(&file);
    })?;

    match repo.set_template_file(template.id, &file) {
        Ok(template) => {
            log::info!("Template {} uploaded by {}", template.id, user.email);
            Ok(template)
        }
        Err(err) => {
            storage.discard(&file);
            Err(err.into())
        }
    }
}

pub fn update_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
    form: TemplateForm,
) -> ServiceResult<Template>
where
    R: TemplateReader + TemplateWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_template(repo, template_id)?;
    let updates = UpdateTemplate::try_from(form)?;

    Ok(repo.update_template(template.id, &updates)?)
}

/// Swaps the DOCX file of a template.
pub fn replace_template_file<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    template_id: i32,
    form: &ReplaceTemplateFileForm,
) -> ServiceResult<Template>
where
    R: TemplateReader + TemplateWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_template(repo, template_id)?;
    let file_name = form
        .file
        .file_name
        .clone()
        .filter(|name| name.to_ascii_lowercase().ends_with(".docx"))
        .ok_or(FormError::UnsupportedFile)?;

    let file = storage
        .save_upload(Folder::Templates, form.file.file.path(), &file_name)
        .map_err(storage_failure("store template"))?;

    match repo.set_template_file(template.id, &file) {
        Ok(updated) => {
            if let Some(previous) = &template.file {
                storage.discard(previous);
            }
            Ok(updated)
        }
        Err(err) => {
            storage.discard(&file);
            Err(err.into())
        }
    }
}

/// Deletes a template unless quotations or invoices were generated from it.
pub fn delete_template<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<()>
where
    R: TemplateReader + TemplateWriter + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_template(repo, template_id)?;
    repo.delete_template(template.id)
        .map_err(delete_conflict("template"))?;
    if let Some(file) = &template.file {
        storage.discard(file);
    }
    Ok(())
}

pub fn template_download<R>(
    repo: &R,
    storage: &FileStorage,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<FileDownload>
where
    R: TemplateReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let template = load_template(repo, template_id)?;
    let file = template.file.ok_or(ServiceError::NotFound)?;

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
    use crate::domain::document::StoredFile;
    use crate::domain::role::Role;
    use crate::domain::template::TemplateStatus;
    use crate::domain::types::{TemplateName, UserId};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use chrono::Utc;

    fn auth(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".into(),
            email: "admin@example.com".into(),
            name: "Admin".into(),
            role_id: role.id(),
            exp: 0,
        }
    }

    fn template(id: i32, kind: TemplateType, with_file: bool) -> Template {
        let now = Utc::now().naive_utc();
        Template {
            id: TemplateId::new(id).unwrap(),
            name: TemplateName::new("Standard").unwrap(),
            description: None,
            template_type: kind,
            file: with_file.then(|| StoredFile {
                path: format!("templates/{id}.docx"),
                name: "standard.docx".into(),
                size: 10,
            }),
            status: TemplateStatus::Saved,
            created_by: UserId::new(1).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_templates_with_files_are_usable() {
        let mut repo = MockRepository::new();
        repo.expect_list_templates().returning(|_| {
            Ok((
                2,
                vec![
                    template(1, TemplateType::Quotation, true),
                    template(2, TemplateType::Quotation, false),
                ],
            ))
        });

        let usable = usable_templates(&repo, TemplateType::Quotation).unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].id.get(), 1);
    }

    #[test]
    fn referenced_template_cannot_be_deleted() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id()
            .returning(|id| Ok(Some(template(id.get(), TemplateType::Invoice, false))));
        repo.expect_delete_template().returning(|_| {
            Err(RepositoryError::ConstraintViolation(
                "Foreign key constraint violation".into(),
            ))
        });
        let storage = FileStorage::new("/tmp/opsdesk-test");

        let result = delete_template(&repo, &storage, &auth(Role::Admin), 3);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn template_page_lists_document_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let stored = storage
            .save_bytes(
                Folder::Templates,
                &docx::tests::build(&[(
                    "word/document.xml",
                    "<w:t>{{client_company_name}} {{due_date}}</w:t>",
                )]),
                "standard.docx",
            )
            .unwrap();

        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id().returning(move |id| {
            let mut template = template(id.get(), TemplateType::Quotation, true);
            template.file = Some(stored.clone());
            Ok(Some(template))
        });
        let editor = EditorConfig {
            document_server_url: "http://docs".into(),
            public_base_url: "http://opsdesk".into(),
            jwt_secret: "secret".into(),
        };

        let page = get_template(&repo, &storage, &editor, &auth(Role::Admin), 1).unwrap();
        assert_eq!(page.placeholders, vec!["client_company_name", "due_date"]);
    }

    #[test]
    fn unreadable_template_file_has_no_placeholders() {
        let storage = FileStorage::new("/tmp/opsdesk-missing");
        let file = StoredFile {
            path: "templates/missing.docx".into(),
            name: "missing.docx".into(),
            size: 0,
        };
        assert!(stored_placeholders(&storage, Some(&file)).is_empty());
        assert!(stored_placeholders(&storage, None).is_empty());
    }

    #[test]
    fn unknown_type_filter_is_rejected() {
        let repo = MockRepository::new();
        let query = ListQuery {
            template_type: Some("receipt".into()),
            ..ListQuery::default()
        };
        let result = list_templates(&repo, &auth(Role::Superadmin), &query);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }
}
