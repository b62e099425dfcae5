//! Registration and login endpoints.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, FieldError, Result};
use crate::models::UserView;
use crate::response::{ApiResponse, RequestId};
use crate::services::{IdentityService, RegisterUser};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 50, message = "Username must be 2-50 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(max = 100, message = "Full name too long"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Tenant name must be 1-100 characters"))]
    pub tenant_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserView,
    pub tenant_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
}

fn check_username(username: &str) -> std::result::Result<(), &'static str> {
    if !username.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err("Username must start with a letter");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Username may only contain letters, digits, '_' and '-'");
    }
    Ok(())
}

/// Client address for audit logging. Proxy headers win over the socket peer
/// because the service normally sits behind a load balancer.
fn client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = req.headers().get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn register(
    service: web::Data<IdentityService>,
    body: web::Json<RegisterRequest>,
    request_id: RequestId,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;
    if let Err(reason) = check_username(&body.username) {
        return Err(AppError::validation(
            reason,
            vec![FieldError::new("username", reason)],
        ));
    }

    let (user, tenant) = service
        .register(
            RegisterUser {
                email: body.email,
                username: body.username,
                password: body.password,
                full_name: body.full_name,
                tenant_name: body.tenant_name,
            },
            true,
        )
        .await?;

    let data = RegisterResponse {
        user: UserView::from(&user),
        tenant_id: tenant.id,
        message: "Registration successful".to_string(),
    };
    Ok(HttpResponse::Created().json(ApiResponse::success(
        data,
        "Registration successful",
        Some(request_id.0),
    )))
}

pub async fn login(
    service: web::Data<IdentityService>,
    body: web::Json<LoginRequest>,
    req: HttpRequest,
    request_id: RequestId,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let ip = client_ip(&req);
    let user = service
        .authenticate(&body.email, &body.password, Some(&ip))
        .await?;

    let data = LoginResponse {
        user: UserView::from(&user),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        data,
        "Login successful",
        Some(request_id.0),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_username_rules() {
        assert!(check_username("alice").is_ok());
        assert!(check_username("a1_b-c").is_ok());
        assert!(check_username("1alice").is_err());
        assert!(check_username("_alice").is_err());
        assert!(check_username("al ice").is_err());
        assert!(check_username("al.ice").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "a@b.com".to_string(),
            username: "alice".to_string(),
            password: "abcd1234".to_string(),
            full_name: None,
            tenant_name: None,
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..ok_clone(&ok)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "abc1".to_string(),
            ..ok_clone(&ok)
        };
        assert!(short_password.validate().is_err());
    }

    fn ok_clone(req: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            email: req.email.clone(),
            username: req.username.clone(),
            password: req.password.clone(),
            full_name: req.full_name.clone(),
            tenant_name: req.tenant_name.clone(),
        }
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.1"))
            .insert_header(("x-real-ip", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_ip(&req), "198.51.100.2");
    }

    #[test]
    fn test_client_ip_without_headers_or_peer() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), "unknown");
    }
}
