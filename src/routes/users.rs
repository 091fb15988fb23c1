use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::ListQuery;
use crate::forms::users::UserForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, page_error, redirect, redirect_on_error, render_template};
use crate::services::users as users_service;

#[get("/users")]
pub async fn show_users(
    query: web::Query<ListQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match users_service::list_users(repo.get_ref(), &user, &query) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "users",
                &server_config.auth_service_url,
            );
            context.insert("users", &data.users);
            context.insert("roles", &data.roles);
            context.insert("search", &data.search);

            render_template(&tera, "users/index.html", &context)
        }
        Err(err) => page_error(err, "list users"),
    }
}

#[post("/users/add")]
pub async fn add_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UserForm>,
) -> impl Responder {
    match users_service::create_user(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("User added.").send();
            redirect("/users")
        }
        Err(err) => redirect_on_error(err, "/users", "add the user"),
    }
}

#[post("/users/{user_id}/save")]
pub async fn save_user(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UserForm>,
) -> impl Responder {
    match users_service::update_user(repo.get_ref(), &user, user_id.into_inner(), form) {
        Ok(_) => {
            FlashMessage::success("User updated.").send();
            redirect("/users")
        }
        Err(err) => redirect_on_error(err, "/users", "update the user"),
    }
}

#[post("/users/{user_id}/delete")]
pub async fn delete_user(
    user_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match users_service::delete_user(repo.get_ref(), &user, user_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("User deleted.").send();
            redirect("/users")
        }
        Err(err) => redirect_on_error(err, "/users", "delete the user"),
    }
}
