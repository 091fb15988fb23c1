use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::email::{EmailStatus, EmailTemplateType};
use crate::dto::ListQuery;
use crate::forms::emails::{ComposeQuery, EmailTemplateForm, SendEmailForm};
use crate::mailer::EmailSender;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::placeholders::AVAILABLE_VARIABLES;
use crate::repository::DieselRepository;
use crate::routes::{base_context, page_error, redirect, redirect_on_error, render_template};
use crate::services::emails as emails_service;
use crate::storage::FileStorage;

#[get("/emails/templates")]
pub async fn show_email_templates(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match emails_service::list_email_templates(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "emails",
                &server_config.auth_service_url,
            );
            context.insert("templates", &data.templates);
            context.insert("search", &data.search);
            context.insert("template_type", &data.template_type);
            context.insert("template_types", EmailTemplateType::ALL);
            context.insert("variables", AVAILABLE_VARIABLES);

            render_template(&tera, "emails/templates.html", &context)
        }
        Err(err) => page_error(err, "list email templates"),
    }
}

#[get("/emails/templates/{template_id}")]
pub async fn show_email_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match emails_service::get_email_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(template) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "emails",
                &server_config.auth_service_url,
            );
            context.insert("template", &template);
            context.insert("template_types", EmailTemplateType::ALL);
            context.insert("variables", AVAILABLE_VARIABLES);

            render_template(&tera, "emails/template.html", &context)
        }
        Err(err) => page_error(err, "load the email template"),
    }
}

#[post("/emails/templates/add")]
pub async fn add_email_template(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<EmailTemplateForm>,
) -> impl Responder {
    match emails_service::create_email_template(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Email template added.").send();
            redirect("/emails/templates")
        }
        Err(err) => redirect_on_error(err, "/emails/templates", "add the email template"),
    }
}

#[post("/emails/templates/{template_id}/save")]
pub async fn save_email_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<EmailTemplateForm>,
) -> impl Responder {
    let template_id = template_id.into_inner();
    let back = format!("/emails/templates/{template_id}");
    match emails_service::update_email_template(repo.get_ref(), &user, template_id, form) {
        Ok(_) => {
            FlashMessage::success("Email template updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the email template"),
    }
}

#[post("/emails/templates/{template_id}/delete")]
pub async fn delete_email_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match emails_service::delete_email_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Email template deleted.").send();
            redirect("/emails/templates")
        }
        Err(err) => redirect_on_error(err, "/emails/templates", "delete the email template"),
    }
}

#[get("/emails/compose")]
pub async fn compose_email(
    web::Query(query): web::Query<ComposeQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match emails_service::compose_page(repo.get_ref(), &user, query, now) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "emails",
                &server_config.auth_service_url,
            );
            context.insert("templates", &data.templates);
            context.insert("quotations", &data.quotations);
            context.insert("invoices", &data.invoices);
            context.insert("draft", &data.draft);

            render_template(&tera, "emails/compose.html", &context)
        }
        Err(err) => page_error(err, "prepare the email"),
    }
}

#[post("/emails/send")]
pub async fn send_email(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    sender: web::Data<dyn EmailSender>,
    web::Form(form): web::Form<SendEmailForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match emails_service::send_email(
        repo.get_ref(),
        &storage,
        sender.get_ref(),
        &user,
        form,
        now,
    ) {
        Ok(history) if history.status == EmailStatus::Sent => {
            FlashMessage::success(format!("Email sent to {}.", history.recipient_email)).send();
            redirect(&format!("/emails/history/{}", history.id))
        }
        Ok(history) => {
            FlashMessage::error(format!(
                "Email to {} could not be delivered.",
                history.recipient_email
            ))
            .send();
            redirect(&format!("/emails/history/{}", history.id))
        }
        Err(err) => redirect_on_error(err, "/emails/compose", "send the email"),
    }
}

#[get("/emails/history")]
pub async fn show_email_history(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match emails_service::list_email_history(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "emails",
                &server_config.auth_service_url,
            );
            context.insert("history", &data.history);
            context.insert("search", &data.search);
            context.insert("status", &data.status);
            context.insert("statuses", EmailStatus::ALL);

            render_template(&tera, "emails/history.html", &context)
        }
        Err(err) => page_error(err, "list sent emails"),
    }
}

#[get("/emails/history/{history_id}")]
pub async fn show_email(
    history_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match emails_service::get_email_history(repo.get_ref(), &user, history_id.into_inner()) {
        Ok(email) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "emails",
                &server_config.auth_service_url,
            );
            context.insert("email", &email);

            render_template(&tera, "emails/show.html", &context)
        }
        Err(err) => page_error(err, "load the email"),
    }
}
