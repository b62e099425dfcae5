//! End-to-end HTTP tests for the register/login flow.
//!
//! The service is wired with the in-process stores, so these exercise the
//! full request path without a database.

use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use identity_service::db::memory::{InMemoryTenantStore, InMemoryUserStore};
use identity_service::db::{TenantStore, UserStore};
use identity_service::routes::configure_routes;
use identity_service::services::IdentityService;

fn service_data() -> web::Data<IdentityService> {
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let tenants: Arc<dyn TenantStore> = Arc::new(InMemoryTenantStore::new());
    web::Data::new(IdentityService::new(users, tenants))
}

macro_rules! app {
    ($identity:expr) => {
        test::init_service(
            App::new()
                .app_data($identity.clone())
                .configure(configure_routes),
        )
        .await
    };
}

fn register_body() -> Value {
    json!({
        "email": "alice@example.com",
        "username": "alice",
        "password": "abcd1234"
    })
}

#[actix_web::test]
async fn test_register_then_login() {
    let identity = service_data();
    let app = app!(identity);

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["tenant_id"].is_string());
    assert!(body["request_id"].is_string());

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "alice@example.com", "password": "abcd1234" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert!(body["data"]["user"]["last_login_at"].is_string());
}

#[actix_web::test]
async fn test_register_duplicate_email_conflict() {
    let identity = service_data();
    let app = app!(identity);

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);

    let mut again = register_body();
    again["username"] = json!("alice2");
    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(again)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 200005);
    assert_eq!(body["message"], "Email is already registered");
}

#[actix_web::test]
async fn test_register_weak_password_unprocessable() {
    let identity = service_data();
    let app = app!(identity);

    let mut body = register_body();
    body["password"] = json!("abcdefgh");
    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(body)
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 10001);
    assert_eq!(body["errors"][0]["field"], "password");
}

#[actix_web::test]
async fn test_login_wrong_password_is_generic_credential_error() {
    let identity = service_data();
    let app = app!(identity);

    test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body())
        .send_request(&app)
        .await;

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "alice@example.com", "password": "wrong-pass1" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 200003);
    assert_eq!(body["message"], "Incorrect email or password");
}

#[actix_web::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let identity = service_data();
    let app = app!(identity);

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": "ghost@example.com", "password": "abcd1234" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 200003);
    assert_eq!(body["message"], "Incorrect email or password");
}

#[actix_web::test]
async fn test_request_id_is_echoed() {
    let identity = service_data();
    let app = app!(identity);

    let resp = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .insert_header(("x-request-id", "req-abc-123"))
        .set_json(register_body())
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["request_id"], "req-abc-123");
}

#[actix_web::test]
async fn test_health() {
    let identity = service_data();
    let app = app!(identity);

    let resp = test::TestRequest::get()
        .uri("/health")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
}
