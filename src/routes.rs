//! Route table.

use actix_web::{web, HttpResponse};

use crate::handlers::auth;
use crate::response::ApiResponse;

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        serde_json::json!({ "status": "ok" }),
        "success",
        None,
    ))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api/v1").service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login)),
        ),
    );
}
