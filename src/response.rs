//! Uniform response envelopes.
//!
//! Every endpoint answers with the same `{code, message, data, request_id}`
//! shape; list endpoints add pagination metadata, error responses add
//! field-level details (see `error.rs`).

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::FieldError;
use crate::error_codes::ErrorCode;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    pub request_id: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>, request_id: Option<String>) -> Self {
        Self {
            code: ErrorCode::Success.as_i32(),
            message: message.into(),
            data: Some(data),
            request_id,
        }
    }
}

/// Error envelope; built by the `ResponseError` boundary.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    pub request_id: Option<String>,
}

/// Pagination metadata for list envelopes.
#[derive(Debug, Serialize, PartialEq)]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if page_size > 0 {
            total.div_ceil(page_size)
        } else {
            0
        };
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// List envelope.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub request_id: Option<String>,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(
        data: Vec<T>,
        page: u64,
        page_size: u64,
        total: u64,
        request_id: Option<String>,
    ) -> Self {
        Self {
            code: ErrorCode::Success.as_i32(),
            message: "success".to_string(),
            data,
            meta: PageMeta::new(page, page_size, total),
            request_id,
        }
    }
}

/// Correlation id for the current request.
///
/// Taken from the `X-Request-Id` header when the request-id middleware (or an
/// upstream proxy) set one, generated otherwise, and echoed in the envelope.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn from_http_request(req: &HttpRequest) -> Self {
        let id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        RequestId(id)
    }
}

impl FromRequest for RequestId {
    type Error = actix_web::Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(RequestId::from_http_request(req)))
    }
}
