//! HTTP handlers and the helpers they share.
//!
//! Handlers stay thin: they extract the request, call one service operation
//! and translate its result into a page, a redirect with a flash message or a
//! JSON body.

use actix_files::NamedFile;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, mime};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::ADMIN_ROLES;
use crate::dto::FileDownload;
use crate::guard::{SessionUser, check_role};
use crate::models::auth::AuthenticatedUser;
use crate::services::ServiceError;

pub mod api;
pub mod clients;
pub mod editor;
pub mod emails;
pub mod invoices;
pub mod main;
pub mod notifications;
pub mod partners;
pub mod quotations;
pub mod settings;
pub mod templates;
pub mod users;

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, the signed-in user and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &SessionUser::from(user));
    context.insert("is_admin", &check_role(user.role_id, ADMIN_ROLES));
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type(mime::TEXT_HTML_UTF_8)
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Flashes the failure of a form submission and sends the user back.
pub(crate) fn redirect_on_error(err: ServiceError, back: &str, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized | ServiceError::Forbidden => {
            FlashMessage::error("Access denied.").send();
            redirect("/na")
        }
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send();
            redirect(back)
        }
        ServiceError::TypeConstraint(message) => {
            FlashMessage::error(format!("Invalid input: {message}")).send();
            redirect(back)
        }
        ServiceError::NotFound => {
            FlashMessage::error("The record no longer exists.").send();
            redirect(back)
        }
        err => {
            log::error!("Failed to {action}: {err}");
            FlashMessage::error(format!("Failed to {action}.")).send();
            redirect(back)
        }
    }
}

/// Response for a page that could not be loaded.
pub(crate) fn page_error(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized | ServiceError::Forbidden => {
            FlashMessage::error("Access denied.").send();
            redirect("/na")
        }
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::TypeConstraint(message) | ServiceError::Form(message) => {
            HttpResponse::BadRequest().body(message)
        }
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// JSON API status for a failed operation.
///
/// Only a rejected token yields `401`; a signed-in user lacking the role gets
/// `403` so clients keep their session.
pub(crate) fn api_error(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::Forbidden => HttpResponse::Forbidden().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message)
        | ServiceError::Conflict(message)
        | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Warns about placeholders a generated document left unfilled.
pub(crate) fn warn_unfilled(unfilled: &[String]) {
    if !unfilled.is_empty() {
        FlashMessage::warning(format!("Unfilled placeholders: {}", unfilled.join(", "))).send();
    }
}

/// Streams a stored file as an attachment.
pub(crate) fn file_response(req: &HttpRequest, download: FileDownload) -> HttpResponse {
    let content_type = download
        .mime_type
        .parse::<mime::Mime>()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    match NamedFile::open(&download.path) {
        Ok(file) => file
            .set_content_type(content_type)
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(download.name)],
            })
            .into_response(req),
        Err(err) => {
            log::error!("Failed to open {}: {err}", download.path.display());
            HttpResponse::NotFound().finish()
        }
    }
}
