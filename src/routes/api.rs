//! JSON endpoints used by the list pages and the notification poller.

use actix_web::{HttpResponse, Responder, get, post, web};

use crate::dto::ListQuery;
use crate::models::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::api_error;
use crate::services::clients as clients_service;
use crate::services::notifications as notifications_service;

#[get("/v1/clients")]
pub async fn api_v1_clients(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match clients_service::api_list_clients(repo.get_ref(), &user, &query) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => api_error(err, "list clients"),
    }
}

#[get("/v1/notifications")]
pub async fn api_v1_notifications(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::recent_notifications(repo.get_ref(), &user, &query) {
        Ok(notifications) => HttpResponse::Ok().json(notifications),
        Err(err) => api_error(err, "list notifications"),
    }
}

#[get("/v1/notifications/unread-count")]
pub async fn api_v1_unread_count(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::unread_count(repo.get_ref(), &user) {
        Ok(count) => HttpResponse::Ok().json(count),
        Err(err) => api_error(err, "count unread notifications"),
    }
}

#[post("/v1/notifications/{notification_id}/read")]
pub async fn api_v1_mark_read(
    notification_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::mark_read(repo.get_ref(), &user, notification_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => api_error(err, "mark the notification as read"),
    }
}

#[post("/v1/notifications/read-all")]
pub async fn api_v1_mark_all_read(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::mark_all_read(repo.get_ref(), &user) {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({ "updated": updated })),
        Err(err) => api_error(err, "mark notifications as read"),
    }
}
