use actix_multipart::form::MultipartForm;
use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::ListQuery;
use crate::forms::clients::UploadClientsForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, page_error, redirect, redirect_on_error, render_template};
use crate::services::{ServiceError, clients as clients_service};

#[get("/clients")]
pub async fn show_clients(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match clients_service::list_clients(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "clients",
                &server_config.auth_service_url,
            );
            context.insert("clients", &data.clients);
            context.insert("industries", &data.industries);
            context.insert("partners", &data.partners);
            context.insert("search", &data.search);
            context.insert("industry", &data.industry);

            render_template(&tera, "clients/index.html", &context)
        }
        Err(err) => page_error(err, "list clients"),
    }
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match clients_service::get_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "clients",
                &server_config.auth_service_url,
            );
            context.insert("client", &data.client);
            context.insert("partner", &data.partner);
            context.insert("partners", &data.partners);
            context.insert("quotations", &data.quotations);

            render_template(&tera, "clients/show.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Client not found.").send();
            redirect("/clients")
        }
        Err(err) => page_error(err, "load the client"),
    }
}

#[post("/clients/add")]
pub async fn add_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    match clients_service::create_client(repo.get_ref(), &user, form.as_ref()) {
        Ok(client) => {
            FlashMessage::success("Client added.").send();
            redirect(&format!("/clients/{}", client.id))
        }
        Err(err) => redirect_on_error(err, "/clients", "add the client"),
    }
}

#[post("/clients/{client_id}/save")]
pub async fn save_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let back = format!("/clients/{client_id}");
    match clients_service::update_client(repo.get_ref(), &user, client_id, form.as_ref()) {
        Ok(_) => {
            FlashMessage::success("Client updated.").send();
            redirect(&back)
        }
        Err(err) => redirect_on_error(err, &back, "update the client"),
    }
}

#[post("/clients/{client_id}/delete")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match clients_service::delete_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Client deleted.").send();
            redirect("/clients")
        }
        Err(err) => redirect_on_error(err, "/clients", "delete the client"),
    }
}

#[post("/clients/upload")]
pub async fn clients_upload(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadClientsForm>,
) -> impl Responder {
    let clients = match form.parse() {
        Ok(clients) => clients,
        Err(err) => {
            FlashMessage::error(format!("Failed to read the file: {err}")).send();
            return redirect("/clients");
        }
    };

    match clients_service::import_clients(repo.get_ref(), &user, clients) {
        Ok(0) => {
            FlashMessage::warning("No new clients were found in the file.").send();
            redirect("/clients")
        }
        Ok(count) => {
            FlashMessage::success(format!("{count} clients imported.")).send();
            redirect("/clients")
        }
        Err(ServiceError::Forbidden) => {
            FlashMessage::error("Access denied.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to import clients: {err}");
            FlashMessage::error("Failed to import clients.").send();
            redirect("/clients")
        }
    }
}
