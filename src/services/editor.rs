//! Integration with the external document editor.
//!
//! The editor receives a signed configuration pointing at document and
//! callback URLs of this application. Both URLs carry a short-lived token
//! scoped to one document, so the document service can fetch and save files
//! without a user session.

use chrono::{Duration, NaiveDateTime};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::ADMIN_ROLES;
use crate::domain::document::{DocumentKind, StoredFile};
use crate::domain::template::{TemplateStatus, UpdateTemplate};
use crate::domain::types::{InvoiceId, QuotationId, TemplateId};
use crate::dto::editor::{
    DocumentPermissions, EditorCallback, EditorConfigResponse, EditorCustomization,
    EditorDocument, EditorSettings, EditorUser,
};
use crate::dto::{DOCX_MIME_TYPE, FileDownload};
use crate::guard::ensure_role;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::EditorConfig;
use crate::repository::{
    InvoiceReader, InvoiceWriter, QuotationReader, QuotationWriter, TemplateReader,
    TemplateWriter,
};
use crate::services::invoices::load_invoice;
use crate::services::quotations::load_quotation;
use crate::services::templates::load_template;
use crate::services::{ServiceError, ServiceResult, storage_failure};
use crate::storage::FileStorage;

/// Lifetime of document tokens handed to the document service.
const DOCUMENT_TOKEN_HOURS: i64 = 24;

/// Claims of a document access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentClaims {
    pub kind: DocumentKind,
    pub id: i32,
    pub exp: usize,
}

impl DocumentClaims {
    pub fn sign(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

/// Checks that `token` grants access to document `kind`/`id`.
pub fn verify_document_token(
    editor: &EditorConfig,
    token: &str,
    kind: DocumentKind,
    id: i32,
) -> ServiceResult<()> {
    let claims = decode::<DocumentClaims>(
        token,
        &DecodingKey::from_secret(editor.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        log::warn!("Rejected document token for {kind} {id}: {err}");
        ServiceError::Unauthorized
    })?
    .claims;

    if claims.kind == kind && claims.id == id {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Stored file and display title of a document.
fn locate_document<R>(repo: &R, kind: DocumentKind, id: i32) -> ServiceResult<(StoredFile, String)>
where
    R: TemplateReader + QuotationReader + InvoiceReader + ?Sized,
{
    let (file, title) = match kind {
        DocumentKind::Template => {
            let template = load_template(repo, id)?;
            (template.file, template.name.into_inner())
        }
        DocumentKind::Quotation => {
            let quotation = load_quotation(repo, id)?;
            (quotation.file, quotation.quotation_number)
        }
        DocumentKind::Invoice => {
            let invoice = load_invoice(repo, id)?;
            (invoice.file, invoice.invoice_number)
        }
    };
    let file = file.ok_or(ServiceError::NotFound)?;
    Ok((file, title))
}

fn docx_title(title: &str) -> String {
    if title.to_ascii_lowercase().ends_with(".docx") {
        title.to_string()
    } else {
        format!("{title}.docx")
    }
}

fn document_base_url(editor: &EditorConfig, kind: DocumentKind, id: i32) -> String {
    format!(
        "{}/api/v1/documents/{kind}/{id}",
        editor.public_base_url.trim_end_matches('/')
    )
}

/// Builds the signed configuration for opening a document in the editor.
pub fn editor_config<R>(
    repo: &R,
    editor: &EditorConfig,
    user: &AuthenticatedUser,
    kind: DocumentKind,
    id: i32,
    now: NaiveDateTime,
) -> ServiceResult<EditorConfigResponse>
where
    R: TemplateReader + QuotationReader + InvoiceReader + ?Sized,
{
    ensure_role(user.role_id, ADMIN_ROLES)?;

    let (file, title) = locate_document(repo, kind, id)?;

    let expires = now + Duration::hours(DOCUMENT_TOKEN_HOURS);
    let token = DocumentClaims {
        kind,
        id,
        exp: usize::try_from(expires.and_utc().timestamp()).unwrap_or_default(),
    }
    .sign(&editor.jwt_secret)
    .map_err(|err| ServiceError::Internal(format!("failed to sign document token: {err}")))?;

    let base_url = document_base_url(editor, kind, id);
    let mut config = EditorConfigResponse {
        document: EditorDocument {
            file_type: "docx".to_string(),
            key: format!("{kind}_{id}_{}", now.and_utc().timestamp_millis()),
            title: docx_title(&title),
            url: format!("{base_url}?token={token}"),
            permissions: DocumentPermissions::default(),
        },
        document_type: "word".to_string(),
        editor_config: EditorSettings {
            callback_url: format!("{base_url}/callback?token={token}"),
            mode: "edit".to_string(),
            lang: "en".to_string(),
            user: EditorUser {
                id: user.sub.clone(),
                name: user.name.clone(),
                group: "editors".to_string(),
            },
            customization: EditorCustomization {
                autosave: true,
                forcesave: true,
            },
        },
        height: "100%".to_string(),
        width: "100%".to_string(),
        token: None,
    };

    let signature = encode(
        &Header::default(),
        &config,
        &EncodingKey::from_secret(editor.jwt_secret.as_bytes()),
    )
    .map_err(|err| ServiceError::Internal(format!("failed to sign editor config: {err}")))?;
    config.token = Some(signature);

    log::info!("Editor opened {kind} {id} for {}", user.email);
    Ok(config)
}

/// Document requested by the document service.
pub fn document_download<R>(
    repo: &R,
    storage: &FileStorage,
    editor: &EditorConfig,
    kind: DocumentKind,
    id: i32,
    token: &str,
) -> ServiceResult<FileDownload>
where
    R: TemplateReader + QuotationReader + InvoiceReader + ?Sized,
{
    verify_document_token(editor, token, kind, id)?;

    let (file, _) = locate_document(repo, kind, id)?;
    Ok(FileDownload {
        path: storage
            .resolve(&file.path)
            .map_err(storage_failure("locate file"))?,
        name: file.name,
        mime_type: DOCX_MIME_TYPE.to_string(),
    })
}

async fn fetch_edited_file(client: &reqwest::Client, url: &str) -> ServiceResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|err| ServiceError::Internal(format!("failed to download edited file: {err}")))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ServiceError::Internal(format!("failed to read edited file: {err}")))?;
    Ok(bytes.to_vec())
}

/// Handles a save callback of the document service.
///
/// Only statuses announcing a new version download the edited file; it
/// replaces the stored document in place. A template saved from the editor
/// leaves the draft state.
#[allow(clippy::too_many_arguments)]
pub async fn apply_callback<R>(
    repo: &R,
    storage: &FileStorage,
    client: &reqwest::Client,
    editor: &EditorConfig,
    kind: DocumentKind,
    id: i32,
    token: &str,
    callback: &EditorCallback,
) -> ServiceResult<()>
where
    R: TemplateReader
        + TemplateWriter
        + QuotationReader
        + QuotationWriter
        + InvoiceReader
        + InvoiceWriter
        + ?Sized,
{
    verify_document_token(editor, token, kind, id)?;

    if !callback.has_new_version() {
        log::debug!("Editor callback for {kind} {id} with status {}", callback.status);
        return Ok(());
    }
    let url = callback
        .url
        .as_deref()
        .ok_or_else(|| ServiceError::Form("callback without file url".to_string()))?;

    let (file, _) = locate_document(repo, kind, id)?;
    let bytes = fetch_edited_file(client, url).await?;
    let file = storage
        .overwrite(&file, &bytes)
        .map_err(storage_failure("store edited file"))?;

    match kind {
        DocumentKind::Template => {
            let template = repo.set_template_file(TemplateId::new(id)?, &file)?;
            if template.status == TemplateStatus::Draft {
                repo.update_template(
                    template.id,
                    &UpdateTemplate {
                        name: template.name.clone(),
                        description: template.description.clone(),
                        status: TemplateStatus::Saved,
                    },
                )?;
            }
        }
        DocumentKind::Quotation => {
            repo.set_quotation_file(QuotationId::new(id)?, &file)?;
        }
        DocumentKind::Invoice => {
            repo.set_invoice_file(InvoiceId::new(id)?, &file)?;
        }
    }

    log::info!("Saved edited {kind} {id} ({} bytes)", file.size);
    Ok(())
}
