use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, Level, storage::CookieMessageStore};
use opsdesk::domain::role::Role;
use opsdesk::models::auth::AuthenticatedUser;
use opsdesk::models::config::{EditorConfig, ServerConfig};
use opsdesk::repository::DieselRepository;
use opsdesk::routes::alert_level_to_str;
use opsdesk::routes::api::api_v1_clients;
use opsdesk::routes::main::not_assigned;
use tera::Tera;

mod common;

use common::TestDb;

// Cookie keys need at least 64 bytes.
const SECRET: &str = "routes-test-secret-routes-test-secret-routes-test-secret-routes-test";

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        database_url: ":memory:".into(),
        templates_dir: "templates/**/*".into(),
        secret: SECRET.into(),
        auth_service_url: "http://auth.localhost".into(),
        upload_dir: "uploads".into(),
        zmq_emailer_pub: "tcp://127.0.0.1:5560".into(),
        editor: EditorConfig {
            document_server_url: "http://docs.localhost".into(),
            public_base_url: "http://localhost:8080".into(),
            jwt_secret: "editor-secret".into(),
        },
        reminder_days: 3,
    }
}

fn bearer(role: Role) -> (header::HeaderName, String) {
    let token = AuthenticatedUser {
        sub: "1".into(),
        email: "someone@example.com".into(),
        name: "Someone".into(),
        role_id: role.id(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    }
    .to_jwt(SECRET)
    .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[actix_web::test]
async fn not_assigned_page_renders_for_any_signed_in_user() {
    let key = Key::from(SECRET.as_bytes());
    let flash = FlashMessagesFramework::builder(CookieMessageStore::builder(key).build()).build();
    let tera = Tera::new("templates/**/*").unwrap();
    let app = test::init_service(
        App::new()
            .wrap(flash)
            .app_data(web::Data::new(server_config()))
            .app_data(web::Data::new(tera))
            .service(not_assigned),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/na")
        .insert_header(bearer(Role::User))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Access denied"));
    assert!(body.contains("http://auth.localhost"));
    assert!(!body.contains("href=\"/users\""));
}

#[actix_web::test]
async fn api_distinguishes_bad_tokens_from_missing_roles() {
    let db = TestDb::new("routes_api.db");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(server_config()))
            .app_data(web::Data::new(DieselRepository::new(db.pool())))
            .service(web::scope("/api").service(api_v1_clients)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/clients")
        .insert_header((header::AUTHORIZATION, "Bearer forged"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/clients")
        .insert_header(bearer(Role::User))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/clients?page=18446744073709551615")
        .insert_header(bearer(Role::Admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["clients"], serde_json::json!([]));
}
