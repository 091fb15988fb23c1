use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::invoice::InvoiceStatus;
use crate::dto::ListQuery;
use crate::forms::invoices::{InvoiceForm, InvoiceUpdateForm};
use crate::mailer::EmailSender;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, file_response, page_error, redirect, redirect_on_error, render_template,
    warn_unfilled,
};
use crate::services::invoices as invoices_service;
use crate::storage::FileStorage;

#[get("/invoices")]
pub async fn show_invoices(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match invoices_service::list_invoices(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "invoices",
                &server_config.auth_service_url,
            );
            context.insert("invoices", &data.invoices);
            context.insert("quotations", &data.quotations);
            context.insert("templates", &data.templates);
            context.insert("can_manage", &data.can_manage);
            context.insert("unfilled", &data.unfilled);
            context.insert("search", &data.search);
            context.insert("status", &data.status);
            context.insert("statuses", InvoiceStatus::ALL);

            render_template(&tera, "invoices/index.html", &context)
        }
        Err(err) => page_error(err, "list invoices"),
    }
}

#[get("/invoices/{invoice_id}")]
pub async fn show_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match invoices_service::get_invoice(
        repo.get_ref(),
        &storage,
        &server_config.editor,
        &user,
        invoice_id.into_inner(),
    ) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "invoices",
                &server_config.auth_service_url,
            );
            context.insert("invoice", &data.invoice);
            context.insert("client", &data.client);
            context.insert("quotation", &data.quotation);
            context.insert("can_manage", &data.can_manage);
            context.insert("unfilled", &data.unfilled);
            context.insert("statuses", InvoiceStatus::ALL);
            context.insert("editor_script_url", &data.editor_script_url);

            render_template(&tera, "invoices/show.html", &context)
        }
        Err(err) => page_error(err, "load the invoice"),
    }
}

#[post("/invoices/generate")]
pub async fn generate_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    web::Form(form): web::Form<InvoiceForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match invoices_service::generate_invoice(repo.get_ref(), &storage, &user, form, now) {
        Ok(generated) => {
            let invoice = generated.record;
            FlashMessage::success(format!("Invoice {} generated.", invoice.invoice_number)).send();
            warn_unfilled(&generated.unfilled);
            redirect(&format!("/invoices/{}", invoice.id))
        }
        Err(err) => redirect_on_error(err, "/invoices", "generate the invoice"),
    }
}

#[post("/invoices/{invoice_id}/save")]
pub async fn save_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    sender: web::Data<dyn EmailSender>,
    web::Form(form): web::Form<InvoiceUpdateForm>,
) -> impl Responder {
    let invoice_id = invoice_id.into_inner();
    let back = format!("/invoices/{invoice_id}");
    let now = Utc::now().naive_utc();
    match invoices_service::update_invoice(
        repo.get_ref(),
        sender.get_ref(),
        &user,
        invoice_id,
        form,
        now,
    ) {
        Ok(_) => {
            FlashMessage::success("Invoice updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the invoice"),
    }
}

#[post("/invoices/{invoice_id}/delete")]
pub async fn delete_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match invoices_service::delete_invoice(repo.get_ref(), &storage, &user, invoice_id.into_inner())
    {
        Ok(()) => {
            FlashMessage::success("Invoice deleted.").send();
            redirect("/invoices")
        }
        Err(err) => redirect_on_error(err, "/invoices", "delete the invoice"),
    }
}

#[get("/invoices/{invoice_id}/download")]
pub async fn download_invoice(
    req: HttpRequest,
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match invoices_service::invoice_download(
        repo.get_ref(),
        &storage,
        &user,
        invoice_id.into_inner(),
    ) {
        Ok(download) => file_response(&req, download),
        Err(err) => page_error(err, "download the invoice"),
    }
}
