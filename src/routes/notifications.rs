use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::ListQuery;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, page_error, redirect, redirect_on_error, render_template};
use crate::services::notifications as notifications_service;

#[get("/notifications")]
pub async fn show_notifications(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match notifications_service::list_notifications(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "notifications",
                &server_config.auth_service_url,
            );
            context.insert("notifications", &data.notifications);
            context.insert("unread", &data.unread);
            context.insert("unread_only", &data.unread_only);

            render_template(&tera, "notifications/index.html", &context)
        }
        Err(err) => page_error(err, "list notifications"),
    }
}

#[post("/notifications/{notification_id}/read")]
pub async fn read_notification(
    notification_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::mark_read(repo.get_ref(), &user, notification_id.into_inner()) {
        Ok(()) => redirect("/notifications"),
        Err(err) => redirect_on_error(err, "/notifications", "mark the notification as read"),
    }
}

#[post("/notifications/read-all")]
pub async fn read_all_notifications(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::mark_all_read(repo.get_ref(), &user) {
        Ok(count) => {
            FlashMessage::success(format!("{count} notifications marked as read.")).send();
            redirect("/notifications")
        }
        Err(err) => redirect_on_error(err, "/notifications", "mark notifications as read"),
    }
}

#[post("/notifications/{notification_id}/delete")]
pub async fn delete_notification(
    notification_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match notifications_service::delete_notification(
        repo.get_ref(),
        &user,
        notification_id.into_inner(),
    ) {
        Ok(()) => redirect("/notifications"),
        Err(err) => redirect_on_error(err, "/notifications", "delete the notification"),
    }
}
