//! Endpoints used by the external document editor.
//!
//! The configuration endpoint requires a signed-in user. The document and
//! callback endpoints are called by the document service itself and are
//! authorised by the token in their query string.

use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use chrono::Utc;

use crate::domain::document::DocumentKind;
use crate::dto::editor::{CallbackReply, DocumentTokenQuery, EditorCallback};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{api_error, file_response};
use crate::services::ServiceError;
use crate::services::editor as editor_service;
use crate::storage::FileStorage;

#[get("/v1/editor/{kind}/{id}/config")]
pub async fn editor_config(
    path: web::Path<(DocumentKind, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let now = Utc::now().naive_utc();
    match editor_service::editor_config(
        repo.get_ref(),
        &server_config.editor,
        &user,
        kind,
        id,
        now,
    ) {
        Ok(config) => HttpResponse::Ok().json(config),
        Err(err) => api_error(err, "prepare the editor"),
    }
}

#[get("/v1/documents/{kind}/{id}")]
pub async fn editor_document(
    req: HttpRequest,
    path: web::Path<(DocumentKind, i32)>,
    query: web::Query<DocumentTokenQuery>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    match editor_service::document_download(
        repo.get_ref(),
        &storage,
        &server_config.editor,
        kind,
        id,
        &query.token,
    ) {
        Ok(download) => file_response(&req, download),
        Err(err) => api_error(err, "serve the document"),
    }
}

#[post("/v1/documents/{kind}/{id}/callback")]
pub async fn editor_callback(
    path: web::Path<(DocumentKind, i32)>,
    query: web::Query<DocumentTokenQuery>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    http: web::Data<reqwest::Client>,
    server_config: web::Data<ServerConfig>,
    web::Json(callback): web::Json<EditorCallback>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let result = editor_service::apply_callback(
        repo.get_ref(),
        &storage,
        http.get_ref(),
        &server_config.editor,
        kind,
        id,
        &query.token,
        &callback,
    )
    .await;

    let reply = match result {
        Ok(()) => CallbackReply::ok(),
        Err(ServiceError::Unauthorized) => {
            log::warn!("Rejected editor callback for {kind} {id}: invalid token");
            CallbackReply::failed("invalid token")
        }
        Err(err) => {
            log::error!("Failed to save edited {kind} {id}: {err}");
            CallbackReply::failed(err.to_string())
        }
    };
    HttpResponse::Ok().json(reply)
}
