use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::ListQuery;
use crate::forms::partners::{PartnerForm, UploadContractForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, file_response, page_error, redirect, redirect_on_error, render_template,
};
use crate::services::partners as partners_service;
use crate::storage::FileStorage;

#[get("/partners")]
pub async fn show_partners(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match partners_service::list_partners(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "partners",
                &server_config.auth_service_url,
            );
            context.insert("partners", &data.partners);
            context.insert("search", &data.search);

            render_template(&tera, "partners/index.html", &context)
        }
        Err(err) => page_error(err, "list partners"),
    }
}

#[get("/partners/{partner_id}")]
pub async fn show_partner(
    partner_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match partners_service::get_partner(repo.get_ref(), &user, partner_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "partners",
                &server_config.auth_service_url,
            );
            context.insert("partner", &data.partner);
            context.insert("clients", &data.clients);

            render_template(&tera, "partners/show.html", &context)
        }
        Err(err) => page_error(err, "load the partner"),
    }
}

#[post("/partners/add")]
pub async fn add_partner(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PartnerForm>,
) -> impl Responder {
    match partners_service::create_partner(repo.get_ref(), &user, form) {
        Ok(partner) => {
            FlashMessage::success("Partner added.").send();
            redirect(&format!("/partners/{}", partner.id))
        }
        Err(err) => redirect_on_error(err, "/partners", "add the partner"),
    }
}

#[post("/partners/{partner_id}/save")]
pub async fn save_partner(
    partner_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PartnerForm>,
) -> impl Responder {
    let partner_id = partner_id.into_inner();
    let back = format!("/partners/{partner_id}");
    match partners_service::update_partner(repo.get_ref(), &user, partner_id, form) {
        Ok(_) => {
            FlashMessage::success("Partner updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the partner"),
    }
}

#[post("/partners/{partner_id}/delete")]
pub async fn delete_partner(
    partner_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match partners_service::delete_partner(repo.get_ref(), &storage, &user, partner_id.into_inner())
    {
        Ok(()) => {
            FlashMessage::success("Partner deleted.").send();
            redirect("/partners")
        }
        Err(err) => redirect_on_error(err, "/partners", "delete the partner"),
    }
}

#[post("/partners/{partner_id}/contract")]
pub async fn upload_contract(
    partner_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    MultipartForm(form): MultipartForm<UploadContractForm>,
) -> impl Responder {
    let partner_id = partner_id.into_inner();
    let back = format!("/partners/{partner_id}");
    match partners_service::upload_contract(repo.get_ref(), &storage, &user, partner_id, &form) {
        Ok(_) => {
            FlashMessage::success("Contract uploaded.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "upload the contract"),
    }
}

#[get("/partners/{partner_id}/contract")]
pub async fn download_contract(
    req: HttpRequest,
    partner_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match partners_service::contract_download(
        repo.get_ref(),
        &storage,
        &user,
        partner_id.into_inner(),
    ) {
        Ok(download) => file_response(&req, download),
        Err(err) => page_error(err, "download the contract"),
    }
}
