//! Business error hierarchy and the HTTP boundary for it.
//!
//! Every fallible service operation returns [`AppError`]. The service layer
//! never picks a transport status itself; the mapping from error code to
//! HTTP status happens once, in the [`ResponseError`] impl at the bottom of
//! this file.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::error_codes::ErrorCode;
use crate::response::ErrorEnvelope;

pub type Result<T> = std::result::Result<T, AppError>;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
            code: None,
        }
    }
}

/// Closed set of business errors.
///
/// Each variant carries its taxonomy code and a user-facing message; the
/// message defaults from [`ErrorCode::default_message`] unless a constructor
/// overrides it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Authentication {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Authorization {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    NotFound {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Conflict {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    RateLimit {
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    ExternalService {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Database {
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    File {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("{message}")]
    Model {
        code: ErrorCode,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Anything not part of the business hierarchy. Surfaces as a generic
    /// system error with a fixed, non-descriptive message.
    #[error("{message}")]
    Internal {
        message: String,
        data: Option<serde_json::Value>,
    },
}

impl AppError {
    pub fn authentication(code: ErrorCode) -> Self {
        Self::authentication_with(code, code.default_message())
    }

    pub fn authentication_with(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Authentication {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn authorization(code: ErrorCode) -> Self {
        AppError::Authorization {
            code,
            message: code.default_message().to_string(),
            data: None,
        }
    }

    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors,
            data: None,
        }
    }

    /// "`<resource>` not found" with the generic not-found code.
    pub fn not_found(resource: &str) -> Self {
        Self::not_found_coded(ErrorCode::NotFound, resource)
    }

    /// Not-found with an explicit taxonomy code (user, tenant, ...).
    pub fn not_found_coded(code: ErrorCode, resource: &str) -> Self {
        AppError::NotFound {
            code,
            message: format!("{resource} not found"),
            data: None,
        }
    }

    pub fn conflict(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        AppError::RateLimit {
            message: ErrorCode::RateLimitExceeded.default_message().to_string(),
            data: retry_after.map(|secs| json!({ "retry_after": secs })),
        }
    }

    pub fn external_service(service_name: Option<&str>) -> Self {
        let message = match service_name {
            Some(name) => format!("{name} service temporarily unavailable"),
            None => ErrorCode::ExternalServiceError.default_message().to_string(),
        };
        AppError::ExternalService {
            code: ErrorCode::ExternalServiceError,
            message,
            data: None,
        }
    }

    pub fn database() -> Self {
        AppError::Database {
            message: ErrorCode::DatabaseError.default_message().to_string(),
            data: None,
        }
    }

    pub fn file(code: ErrorCode) -> Self {
        AppError::File {
            code,
            message: code.default_message().to_string(),
            data: None,
        }
    }

    pub fn model(model_name: Option<&str>) -> Self {
        let message = match model_name {
            Some(name) => format!("Model {name} returned an error"),
            None => ErrorCode::ModelResponseError.default_message().to_string(),
        };
        AppError::Model {
            code: ErrorCode::ModelResponseError,
            message,
            data: None,
        }
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        // The detail goes to the log, never to the wire.
        tracing::error!(error = %detail, "internal error");
        AppError::Internal {
            message: ErrorCode::SystemError.default_message().to_string(),
            data: None,
        }
    }

    /// Attach a structured payload, surfaced in the envelope's `data` field.
    pub fn with_data(mut self, value: serde_json::Value) -> Self {
        match &mut self {
            AppError::Authentication { data, .. }
            | AppError::Authorization { data, .. }
            | AppError::Validation { data, .. }
            | AppError::NotFound { data, .. }
            | AppError::Conflict { data, .. }
            | AppError::RateLimit { data, .. }
            | AppError::ExternalService { data, .. }
            | AppError::Database { data, .. }
            | AppError::File { data, .. }
            | AppError::Model { data, .. }
            | AppError::Internal { data, .. } => *data = Some(value),
        }
        self
    }

    /// Taxonomy code carried by this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication { code, .. }
            | AppError::Authorization { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::ExternalService { code, .. }
            | AppError::File { code, .. }
            | AppError::Model { code, .. } => *code,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::RateLimit { .. } => ErrorCode::RateLimitExceeded,
            AppError::Database { .. } => ErrorCode::DatabaseError,
            AppError::Internal { .. } => ErrorCode::SystemError,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Authentication { message, .. }
            | AppError::Authorization { message, .. }
            | AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::RateLimit { message, .. }
            | AppError::ExternalService { message, .. }
            | AppError::Database { message, .. }
            | AppError::File { message, .. }
            | AppError::Model { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    /// Structured payload surfaced in the envelope's `data` field.
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Authentication { data, .. }
            | AppError::Authorization { data, .. }
            | AppError::Validation { data, .. }
            | AppError::NotFound { data, .. }
            | AppError::Conflict { data, .. }
            | AppError::RateLimit { data, .. }
            | AppError::ExternalService { data, .. }
            | AppError::Database { data, .. }
            | AppError::File { data, .. }
            | AppError::Model { data, .. }
            | AppError::Internal { data, .. } => data.clone(),
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            AppError::Validation { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }

    fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Database { .. } | AppError::ExternalService { .. } | AppError::Internal { .. }
        )
    }
}

/// Fixed mapping from taxonomy code to transport status.
pub fn transport_status(code: ErrorCode) -> StatusCode {
    use ErrorCode::*;
    match code {
        Unauthorized | TokenInvalid | TokenExpired | RefreshTokenExpired => {
            StatusCode::UNAUTHORIZED
        }
        PermissionDenied | AccountDisabled | AccountLocked => StatusCode::FORBIDDEN,
        NotFound | UserNotFound | ConversationNotFound | MessageNotFound
        | KnowledgeBaseNotFound | DocumentNotFound | AgentNotFound | ToolNotFound
        | WorkflowNotFound | FileNotFound | ModelNotFound => StatusCode::NOT_FOUND,
        ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
        RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        UserAlreadyExists | EmailAlreadyExists | PhoneAlreadyExists => StatusCode::CONFLICT,
        ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        SystemError | DatabaseError | CacheError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        transport_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.code();

        // Business errors are expected; infrastructure failures are not.
        if self.is_infrastructure() {
            tracing::error!(
                error_code = code.as_i32(),
                error_message = %self.message(),
                "infrastructure error"
            );
        } else {
            tracing::warn!(
                error_code = code.as_i32(),
                error_message = %self.message(),
                "business error"
            );
        }

        let body = ErrorEnvelope {
            code: code.as_i32(),
            message: self.message().to_string(),
            data: self.data(),
            errors: self.field_errors().map(|e| e.to_vec()),
            request_id: None,
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(conflict) = conflict_from_unique_violation(&err) {
            return conflict;
        }
        tracing::error!(error = %err, "database error");
        AppError::database()
    }
}

/// Translate a Postgres unique-constraint violation into the matching
/// conflict error. This is the backstop for the check-then-act races in
/// registration: the database constraint wins, the service reports it as the
/// same conflict the pre-check would have raised.
fn conflict_from_unique_violation(err: &sqlx::Error) -> Option<AppError> {
    let db_err = match err {
        sqlx::Error::Database(e) => e,
        _ => return None,
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    let constraint = db_err.constraint().unwrap_or_default();
    let app_err = if constraint.contains("email") {
        AppError::conflict(ErrorCode::EmailAlreadyExists, "Email is already registered")
    } else if constraint.contains("slug") {
        AppError::conflict(ErrorCode::UserAlreadyExists, "Tenant slug already exists")
    } else if constraint.contains("username") {
        AppError::conflict(
            ErrorCode::UserAlreadyExists,
            "Username already exists in this tenant",
        )
    } else {
        AppError::conflict(ErrorCode::UserAlreadyExists, "Resource already exists")
    };
    Some(app_err)
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: Some(field.to_string()),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {field}")),
                    code: Some(e.code.to_string()),
                })
            })
            .collect();
        AppError::validation(ErrorCode::ValidationError.default_message(), details)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(err)
    }
}
