use actix_web::{
    App, HttpResponse,
    http::{StatusCode, header},
    test, web,
};

use opsdesk::middleware::RedirectUnauthorized;
use opsdesk::models::auth::AuthenticatedUser;
use opsdesk::models::config::{EditorConfig, ServerConfig};

const SECRET: &str = "middleware-test-secret";

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

async fn whoami(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().body(user.email)
}

#[actix_web::test]
async fn redirects_unauthorized_to_signin() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Unauthorized().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/signin"
    );
}

#[actix_web::test]
async fn success_response_passes_through() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
    )
    .await;

    let req = test::TestRequest::default().to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn forbidden_is_not_treated_as_signed_out() {
    let app = test::init_service(
        App::new()
            .wrap(RedirectUnauthorized)
            .default_service(web::to(|| async { HttpResponse::Forbidden().finish() })),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::default().to_request()).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(header::LOCATION).is_none());
}

#[actix_web::test]
async fn bad_bearer_token_is_sent_to_signin() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(server_config()))
            .wrap(RedirectUnauthorized)
            .route("/", web::get().to(whoami)),
    )
    .await;

    for authorization in [None, Some("Bearer not-a-token"), Some("Basic YWRtaW4=")] {
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = authorization {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{authorization:?}");
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/auth/signin"
        );
    }
}

#[actix_web::test]
async fn valid_bearer_token_reaches_the_handler() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(server_config()))
            .wrap(RedirectUnauthorized)
            .route("/", web::get().to(whoami)),
    )
    .await;

    let token = AuthenticatedUser {
        sub: "1".into(),
        email: "admin@example.com".into(),
        name: "Admin".into(),
        role_id: 2,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    }
    .to_jwt(SECRET)
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;

    assert_eq!(body, "admin@example.com");
}
