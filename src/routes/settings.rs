use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::settings::CompanySettingsForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, page_error, redirect, redirect_on_error, render_template};
use crate::services::settings as settings_service;

#[get("/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match settings_service::get_settings(repo.get_ref(), &user) {
        Ok(settings) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "settings",
                &server_config.auth_service_url,
            );
            context.insert("settings", &settings);

            render_template(&tera, "settings/index.html", &context)
        }
        Err(err) => page_error(err, "load the company settings"),
    }
}

#[post("/settings")]
pub async fn save_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CompanySettingsForm>,
) -> impl Responder {
    match settings_service::save_settings(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("Company settings saved.").send();
            redirect("/settings")
        }
        Err(err) => redirect_on_error(err, "/settings", "save the company settings"),
    }
}
