use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::template::{TemplateStatus, TemplateType};
use crate::dto::ListQuery;
use crate::forms::templates::{ReplaceTemplateFileForm, TemplateForm, UploadTemplateForm};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::placeholders::AVAILABLE_VARIABLES;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, file_response, page_error, redirect, redirect_on_error, render_template,
};
use crate::services::templates as templates_service;
use crate::storage::FileStorage;

#[get("/templates")]
pub async fn show_templates(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match templates_service::list_templates(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "templates",
                &server_config.auth_service_url,
            );
            context.insert("templates", &data.templates);
            context.insert("search", &data.search);
            context.insert("template_type", &data.template_type);
            context.insert("template_types", TemplateType::ALL);

            render_template(&tera, "templates/index.html", &context)
        }
        Err(err) => page_error(err, "list templates"),
    }
}

#[get("/templates/{template_id}")]
pub async fn show_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match templates_service::get_template(
        repo.get_ref(),
        &storage,
        &server_config.editor,
        &user,
        template_id.into_inner(),
    ) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "templates",
                &server_config.auth_service_url,
            );
            context.insert("template", &data.template);
            context.insert("placeholders", &data.placeholders);
            context.insert("variables", AVAILABLE_VARIABLES);
            context.insert("statuses", TemplateStatus::ALL);
            context.insert("editor_script_url", &data.editor_script_url);

            render_template(&tera, "templates/show.html", &context)
        }
        Err(err) => page_error(err, "load the template"),
    }
}

#[post("/templates/upload")]
pub async fn upload_template(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    MultipartForm(form): MultipartForm<UploadTemplateForm>,
) -> impl Responder {
    match templates_service::upload_template(repo.get_ref(), &storage, &user, &form) {
        Ok(template) => {
            FlashMessage::success("Template uploaded.").send();
            redirect(&format!("/templates/{}", template.id))
        }
        Err(err) => redirect_on_error(err, "/templates", "upload the template"),
    }
}

#[post("/templates/{template_id}/save")]
pub async fn save_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TemplateForm>,
) -> impl Responder {
    let template_id = template_id.into_inner();
    let back = format!("/templates/{template_id}");
    match templates_service::update_template(repo.get_ref(), &user, template_id, form) {
        Ok(_) => {
            FlashMessage::success("Template updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the template"),
    }
}

#[post("/templates/{template_id}/file")]
pub async fn replace_template_file(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
    MultipartForm(form): MultipartForm<ReplaceTemplateFileForm>,
) -> impl Responder {
    let template_id = template_id.into_inner();
    let back = format!("/templates/{template_id}");
    match templates_service::replace_template_file(
        repo.get_ref(),
        &storage,
        &user,
        template_id,
        &form,
    ) {
        Ok(_) => {
            FlashMessage::success("Template file replaced.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "replace the template file"),
    }
}

#[post("/templates/{template_id}/delete")]
pub async fn delete_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match templates_service::delete_template(
        repo.get_ref(),
        &storage,
        &user,
        template_id.into_inner(),
    ) {
        Ok(()) => {
            FlashMessage::success("Template deleted.").send();
            redirect("/templates")
        }
        Err(err) => redirect_on_error(err, "/templates", "delete the template"),
    }
}

#[get("/templates/{template_id}/download")]
pub async fn download_template(
    req: HttpRequest,
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    storage: web::Data<FileStorage>,
) -> impl Responder {
    match templates_service::template_download(
        repo.get_ref(),
        &storage,
        &user,
        template_id.into_inner(),
    ) {
        Ok(download) => file_response(&req, download),
        Err(err) => page_error(err, "download the template"),
    }
}
