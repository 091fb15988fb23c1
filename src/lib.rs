//! Back-office dashboard for clients, partners, document templates,
//! quotations, invoices and outbound email.

#[cfg(feature = "server")]
use std::sync::Arc;
#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

use crate::domain::role::Role;
#[cfg(feature = "server")]
use crate::mailer::{EmailSender, ZmqEmailSender};
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::storage::FileStorage;

pub mod db;
pub mod domain;
pub mod guard;
pub mod models;
pub mod pagination;
pub mod placeholders;
pub mod repository;
pub mod schema;
pub mod ui;

#[cfg(feature = "server")]
pub mod docx;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod mailer;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod storage;

mod error_conversions;

/// Every role may sign in and view the dashboard, notifications and invoices.
pub const ALL_ROLES: &[Role] = Role::ALL;
/// Roles allowed to manage records.
pub const ADMIN_ROLES: &[Role] = &[Role::Superadmin, Role::Admin];

/// Timeout for downloads of edited files from the document service.
#[cfg(feature = "server")]
const EDITOR_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    use crate::routes::api::{
        api_v1_clients, api_v1_mark_all_read, api_v1_mark_read, api_v1_notifications,
        api_v1_unread_count,
    };
    use crate::routes::clients::{
        add_client, clients_upload, delete_client, save_client, show_client, show_clients,
    };
    use crate::routes::editor::{editor_callback, editor_config, editor_document};
    use crate::routes::emails::{
        add_email_template, compose_email, delete_email_template, save_email_template,
        send_email, show_email, show_email_history, show_email_template, show_email_templates,
    };
    use crate::routes::invoices::{
        delete_invoice, download_invoice, generate_invoice, save_invoice, show_invoice,
        show_invoices,
    };
    use crate::routes::main::{logout, not_assigned, show_index};
    use crate::routes::notifications::{
        delete_notification, read_all_notifications, read_notification, show_notifications,
    };
    use crate::routes::partners::{
        add_partner, delete_partner, download_contract, save_partner, show_partner,
        show_partners, upload_contract,
    };
    use crate::routes::quotations::{
        delete_quotation, download_quotation, generate_quotation, save_quotation,
        show_quotation, show_quotations,
    };
    use crate::routes::settings::{save_settings, show_settings};
    use crate::routes::templates::{
        delete_template, download_template, replace_template_file, save_template,
        show_template, show_templates, upload_template,
    };
    use crate::routes::users::{add_user, delete_user, save_user, show_users};

    // Publisher used for outbound email.
    let sender: Arc<dyn EmailSender> = Arc::new(
        ZmqEmailSender::connect(&server_config.zmq_emailer_pub)
            .map_err(|e| std::io::Error::other(format!("Failed to start ZMQ sender: {e}")))?,
    );
    let sender = web::Data::from(sender);

    // Establish Diesel connection pool for the SQLite database.
    let pool = db::establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);
    let storage = FileStorage::new(&server_config.upload_dir);

    let http_client = reqwest::Client::builder()
        .timeout(EDITOR_FETCH_TIMEOUT)
        .build()
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(
                web::scope("/api")
                    .service(editor_document)
                    .service(editor_callback)
                    .service(api_v1_clients)
                    .service(api_v1_notifications)
                    .service(api_v1_unread_count)
                    .service(api_v1_mark_read)
                    .service(api_v1_mark_all_read)
                    .service(editor_config),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(show_clients)
                    .service(add_client)
                    .service(clients_upload)
                    .service(show_client)
                    .service(save_client)
                    .service(delete_client)
                    .service(show_partners)
                    .service(add_partner)
                    .service(show_partner)
                    .service(save_partner)
                    .service(delete_partner)
                    .service(upload_contract)
                    .service(download_contract)
                    .service(show_users)
                    .service(add_user)
                    .service(save_user)
                    .service(delete_user)
                    .service(show_templates)
                    .service(upload_template)
                    .service(show_template)
                    .service(save_template)
                    .service(replace_template_file)
                    .service(delete_template)
                    .service(download_template)
                    .service(show_quotations)
                    .service(generate_quotation)
                    .service(show_quotation)
                    .service(save_quotation)
                    .service(delete_quotation)
                    .service(download_quotation)
                    .service(show_invoices)
                    .service(generate_invoice)
                    .service(show_invoice)
                    .service(save_invoice)
                    .service(delete_invoice)
                    .service(download_invoice)
                    .service(show_email_templates)
                    .service(add_email_template)
                    .service(show_email_template)
                    .service(save_email_template)
                    .service(delete_email_template)
                    .service(compose_email)
                    .service(send_email)
                    .service(show_email_history)
                    .service(show_email)
                    .service(show_notifications)
                    .service(read_all_notifications)
                    .service(read_notification)
                    .service(delete_notification)
                    .service(show_settings)
                    .service(save_settings)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(http_client.clone()))
            .app_data(sender.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
