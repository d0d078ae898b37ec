//! Integration tests for the routes that can be driven without a database:
//! health/banner, bearer-token rejection paths, and avatar serving.
//!
//! Flows that touch PostgreSQL (registration, CRUD, ownership checks) need a
//! live database; their pure-logic parts are unit-tested next to the
//! handlers and query modules.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::{App, test, web};
use secrecy::SecretString;
use serde_json::Value;

use code_tutor_lib::api;
use code_tutor_lib::auth::create_token;
use code_tutor_lib::config::{Config, Environment};
use code_tutor_lib::services::AvatarCache;

fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        jwt_secret: SecretString::from("integration-test-secret"),
        jwt_expires_in_secs: 3600,
        frontend_url: "http://localhost:5173".to_string(),
        backend_url: "http://localhost:3000".to_string(),
        max_upload_size: 1024 * 1024,
        avatar_ttl_secs: 3600,
        avatar_sweep_interval_secs: 1800,
    }
}

#[actix_rt::test]
async fn health_reports_ok_with_timestamp() {
    let app = test::init_service(App::new().configure(api::configure_health_routes)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[actix_rt::test]
async fn root_banner_lists_endpoints() {
    let app = test::init_service(App::new().configure(api::configure_health_routes)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["endpoints"]["auth"], "/auth");
    assert_eq!(body["endpoints"]["chat"], "/chat");
}

#[actix_rt::test]
async fn me_rejects_missing_header() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .service(web::scope("/auth").configure(api::configure_auth_routes)),
    )
    .await;

    let req = test::TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn me_rejects_malformed_token() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .service(web::scope("/auth").configure(api::configure_auth_routes)),
    )
    .await;

    for bad in ["Bearer not-a-jwt", "Bearer ", "Token abc", "bearer abc"] {
        let req = test::TestRequest::get()
            .uri("/auth/me")
            .insert_header((header::AUTHORIZATION, bad))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "header {:?} must be rejected", bad);
    }
}

#[actix_rt::test]
async fn me_rejects_token_signed_with_wrong_secret() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .service(web::scope("/auth").configure(api::configure_auth_routes)),
    )
    .await;

    // Well-formed token, but signed with a secret this server does not use
    let forged = create_token(
        uuid::Uuid::new_v4(),
        &SecretString::from("attacker-secret"),
        3600,
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn chat_routes_require_auth() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_config()))
            .service(web::scope("/chat").configure(api::configure_chat_routes)),
    )
    .await;

    let req = test::TestRequest::get().uri("/chat").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::delete().uri("/chat").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn served_avatar_carries_stored_content_type() {
    let cache = Arc::new(AvatarCache::new(Duration::from_secs(60)));
    cache.insert(
        "user-1.png".to_string(),
        vec![0x89, 0x50, 0x4e, 0x47],
        "image/png".to_string(),
    );

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(cache))
            .service(web::scope("/upload").configure(api::configure_upload_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/upload/uploads/user-1.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=1800"
    );

    let body = test::read_body(resp).await;
    assert_eq!(&body[..], &[0x89, 0x50, 0x4e, 0x47][..]);
}

#[actix_rt::test]
async fn unknown_avatar_is_404() {
    let cache = Arc::new(AvatarCache::new(Duration::from_secs(60)));

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(cache))
            .service(web::scope("/upload").configure(api::configure_upload_routes)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/upload/uploads/nobody.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn expired_avatar_is_404() {
    let cache = Arc::new(AvatarCache::new(Duration::from_millis(40)));
    cache.insert("a.png".to_string(), vec![1, 2, 3], "image/png".to_string());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(cache))
            .service(web::scope("/upload").configure(api::configure_upload_routes)),
    )
    .await;

    // Fresh entry is served
    let req = test::TestRequest::get()
        .uri("/upload/uploads/a.png")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    tokio::time::sleep(Duration::from_millis(80)).await;

    // Past its TTL the same URL is gone
    let req = test::TestRequest::get()
        .uri("/upload/uploads/a.png")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}
