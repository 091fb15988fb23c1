use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::quotation::QuotationStatus;
use crate::dto::ListQuery;
use crate::forms::quotations::{QuotationForm, QuotationUpdateForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, file_response, page_error, redirect, redirect_on_error, render_template,
    warn_unfilled,
};
use crate::services::quotations as quotations_service;
use crate::storage::FileStorage;

#[get("/quotations")]
pub async fn show_quotations(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match quotations_service::list_quotations(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "quotations",
                &server_config.auth_service_url,
            );
            context.insert("quotations", &data.quotations);
            context.insert("clients", &data.clients);
            context.insert("templates", &data.templates);
            context.insert("search", &data.search);
            context.insert("status", &data.status);
            context.insert("statuses", QuotationStatus::ALL);

            render_template(&tera, "quotations/index.html", &context)
        }
        Err(err) => page_error(err, "list quotations"),
    }
}

#[get("/quotations/{quotation_id}")]
pub async fn show_quotation(
    quotation_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match quotations_service::get_quotation(
        repo.get_ref(),
        &storage,
        &server_config.editor,
        &user,
        quotation_id.into_inner(),
    ) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "quotations",
                &server_config.auth_service_url,
            );
            context.insert("quotation", &data.quotation);
            context.insert("client", &data.client);
            context.insert("invoices", &data.invoices);
            context.insert("invoice_templates", &data.invoice_templates);
            context.insert("unfilled", &data.unfilled);
            context.insert("statuses", QuotationStatus::ALL);
            context.insert("editor_script_url", &data.editor_script_url);

            render_template(&tera, "quotations/show.html", &context)
        }
        Err(err) => page_error(err, "load the quotation"),
    }
}

#[post("/quotations/generate")]
pub async fn generate_quotation(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    web::Form(form): web::Form<QuotationForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match quotations_service::generate_quotation(repo.get_ref(), &storage, &user, form, now) {
        Ok(generated) => {
            let quotation = generated.record;
            FlashMessage::success(format!(
                "Quotation {} generated.",
                quotation.quotation_number
            ))
            .send();
            warn_unfilled(&generated.unfilled);
            redirect(&format!("/quotations/{}", quotation.id))
        }
        Err(err) => redirect_on_error(err, "/quotations", "generate the quotation"),
    }
}

#[post("/quotations/{quotation_id}/save")]
pub async fn save_quotation(
    quotation_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<QuotationUpdateForm>,
) -> impl Responder {
    let quotation_id = quotation_id.into_inner();
    let back = format!("/quotations/{quotation_id}");
    match quotations_service::update_quotation(repo.get_ref(), &user, quotation_id, form) {
        Ok(_) => {
            FlashMessage::success("Quotation updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the quotation"),
    }
}

#[post("/quotations/{quotation_id}/delete")]
pub async fn delete_quotation(
    quotation_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    let quotation_id = quotation_id.into_inner();
    match quotations_service::delete_quotation(repo.get_ref(), &storage, &user, quotation_id) {
        Ok(()) => {
            FlashMessage::success("Quotation deleted.").send();
            redirect("/quotations")
        }
        Err(err) => redirect_on_error(
            err,
            &format!("/quotations/{quotation_id}"),
            "delete the quotation",
        ),
    }
}

#[get("/quotations/{quotation_id}/download")]
pub async fn download_quotation(
    req: HttpRequest,
    quotation_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match quotations_service::quotation_download(
        repo.get_ref(),
        &storage,
        &user,
        quotation_id.into_inner(),
    ) {
        Ok(download) => file_response(&req, download),
        Err(err) => page_error(err, "download the quotation"),
    }
}
