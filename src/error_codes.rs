//! Business error codes and their default messages.
//!
//! Codes follow the `XXYYYY` convention: the leading digits identify the
//! owning module, the trailing digits the specific error.
//!
//! - 0:       success
//! - 10xxx:   system
//! - 100xxx:  authentication / authorization
//! - 200xxx:  user
//! - 210xxx:  tenant
//! - 300xxx:  conversation
//! - 310xxx:  model
//! - 400xxx:  knowledge base
//! - 500xxx:  agent
//! - 600xxx:  file storage
//! - 700xxx:  external service

/// Closed set of business error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // System (10xxx)
    SystemError = 10000,
    ValidationError = 10001,
    NotFound = 10002,
    MethodNotAllowed = 10003,
    RateLimitExceeded = 10004,
    ServiceUnavailable = 10005,
    DatabaseError = 10006,
    CacheError = 10007,
    TimeoutError = 10008,

    // Authentication / authorization (100xxx)
    Unauthorized = 100001,
    TokenExpired = 100002,
    TokenInvalid = 100003,
    RefreshTokenExpired = 100004,
    PermissionDenied = 100005,
    AccountDisabled = 100006,
    AccountLocked = 100007,
    ApiKeyInvalid = 100008,
    ApiKeyExpired = 100009,

    // User (200xxx)
    UserNotFound = 200001,
    UserAlreadyExists = 200002,
    PasswordIncorrect = 200003,
    PasswordTooWeak = 200004,
    EmailAlreadyExists = 200005,
    EmailNotVerified = 200006,
    PhoneAlreadyExists = 200007,
    VerificationCodeError = 200008,
    VerificationCodeExpired = 200009,

    // Tenant (210xxx)
    TenantNotFound = 210001,
    TenantDisabled = 210002,
    TenantQuotaExceeded = 210003,

    // Conversation (300xxx)
    ConversationNotFound = 300001,
    ConversationLimitExceeded = 300002,
    MessageNotFound = 300003,
    MessageTooLong = 300004,
    ContextTooLong = 300005,
    StreamInterrupted = 300006,

    // Model (310xxx)
    ModelNotFound = 310001,
    ModelNotAvailable = 310002,
    ModelQuotaExceeded = 310003,
    ModelRateLimited = 310004,
    ModelResponseError = 310005,

    // Knowledge base (400xxx)
    KnowledgeBaseNotFound = 400001,
    KnowledgeBaseLimitExceeded = 400002,
    DocumentNotFound = 400003,
    DocumentParseError = 400004,
    DocumentTooLarge = 400005,
    EmbeddingError = 400006,
    RetrievalError = 400007,

    // Agent (500xxx)
    AgentNotFound = 500001,
    AgentExecutionError = 500002,
    ToolNotFound = 500003,
    ToolExecutionError = 500004,
    WorkflowNotFound = 500005,
    WorkflowExecutionError = 500006,

    // File storage (600xxx)
    FileNotFound = 600001,
    FileTooLarge = 600002,
    FileTypeNotAllowed = 600003,
    FileUploadError = 600004,
    StorageError = 600005,

    // External service (700xxx)
    ExternalServiceError = 700001,
    LlmApiError = 700002,
    OauthError = 700003,
    WebhookError = 700004,
}

impl ErrorCode {
    /// Numeric code as carried on the wire.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Default human-readable message for this code.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",

            ErrorCode::SystemError => "Internal server error, please try again later",
            ErrorCode::ValidationError => "Request validation failed",
            ErrorCode::NotFound => "The requested resource does not exist",
            ErrorCode::MethodNotAllowed => "Request method not allowed",
            ErrorCode::RateLimitExceeded => "Too many requests, please try again later",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::CacheError => "Cache service error",
            ErrorCode::TimeoutError => "Request timed out",

            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::TokenExpired => "Session expired, please sign in again",
            ErrorCode::TokenInvalid => "Invalid credentials",
            ErrorCode::RefreshTokenExpired => "Session expired, please sign in again",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AccountDisabled => "Account has been disabled",
            ErrorCode::AccountLocked => "Account has been locked",
            ErrorCode::ApiKeyInvalid => "Invalid API key",
            ErrorCode::ApiKeyExpired => "API key has expired",

            ErrorCode::UserNotFound => "User does not exist",
            ErrorCode::UserAlreadyExists => "User already exists",
            ErrorCode::PasswordIncorrect => "Incorrect password",
            ErrorCode::PasswordTooWeak => "Password is too weak",
            ErrorCode::EmailAlreadyExists => "Email is already registered",
            ErrorCode::EmailNotVerified => "Email has not been verified",
            ErrorCode::PhoneAlreadyExists => "Phone number is already registered",
            ErrorCode::VerificationCodeError => "Incorrect verification code",
            ErrorCode::VerificationCodeExpired => "Verification code has expired",

            ErrorCode::TenantNotFound => "Tenant does not exist",
            ErrorCode::TenantDisabled => "Tenant has been disabled",
            ErrorCode::TenantQuotaExceeded => "Tenant quota exhausted",

            ErrorCode::ConversationNotFound => "Conversation does not exist",
            ErrorCode::ConversationLimitExceeded => "Conversation limit reached",
            ErrorCode::MessageNotFound => "Message does not exist",
            ErrorCode::MessageTooLong => "Message content too long",
            ErrorCode::ContextTooLong => "Context length exceeded",
            ErrorCode::StreamInterrupted => "Streaming output interrupted",

            ErrorCode::ModelNotFound => "Model does not exist",
            ErrorCode::ModelNotAvailable => "Model temporarily unavailable",
            ErrorCode::ModelQuotaExceeded => "Model invocation quota exhausted",
            ErrorCode::ModelRateLimited => "Model invocation rate limited",
            ErrorCode::ModelResponseError => "Model response error",

            ErrorCode::KnowledgeBaseNotFound => "Knowledge base does not exist",
            ErrorCode::KnowledgeBaseLimitExceeded => "Knowledge base limit reached",
            ErrorCode::DocumentNotFound => "Document does not exist",
            ErrorCode::DocumentParseError => "Failed to parse document",
            ErrorCode::DocumentTooLarge => "Document size exceeded",
            ErrorCode::EmbeddingError => "Failed to embed document",
            ErrorCode::RetrievalError => "Knowledge retrieval failed",

            ErrorCode::AgentNotFound => "Agent does not exist",
            ErrorCode::AgentExecutionError => "Agent execution failed",
            ErrorCode::ToolNotFound => "Tool does not exist",
            ErrorCode::ToolExecutionError => "Tool execution failed",
            ErrorCode::WorkflowNotFound => "Workflow does not exist",
            ErrorCode::WorkflowExecutionError => "Workflow execution failed",

            ErrorCode::FileNotFound => "File does not exist",
            ErrorCode::FileTooLarge => "File size exceeded",
            ErrorCode::FileTypeNotAllowed => "File type not allowed",
            ErrorCode::FileUploadError => "File upload failed",
            ErrorCode::StorageError => "Storage service error",

            ErrorCode::ExternalServiceError => "External service call failed",
            ErrorCode::LlmApiError => "AI service temporarily unavailable",
            ErrorCode::OauthError => "Third-party sign-in failed",
            ErrorCode::WebhookError => "Webhook invocation failed",
        }
    }
}

/// Default message for a raw numeric code, falling back to a fixed string
/// for codes outside the taxonomy.
pub fn message_for(code: i32) -> &'static str {
    match ErrorCode::from_i32(code) {
        Some(c) => c.default_message(),
        None => "Unknown error",
    }
}

impl ErrorCode {
    /// Map a raw integer back into the taxonomy.
    pub fn from_i32(code: i32) -> Option<ErrorCode> {
        use ErrorCode::*;
        let c = match code {
            0 => Success,
            10000 => SystemError,
            10001 => ValidationError,
            10002 => NotFound,
            10003 => MethodNotAllowed,
            10004 => RateLimitExceeded,
            10005 => ServiceUnavailable,
            10006 => DatabaseError,
            10007 => CacheError,
            10008 => TimeoutError,
            100001 => Unauthorized,
            100002 => TokenExpired,
            100003 => TokenInvalid,
            100004 => RefreshTokenExpired,
            100005 => PermissionDenied,
            100006 => AccountDisabled,
            100007 => AccountLocked,
            100008 => ApiKeyInvalid,
            100009 => ApiKeyExpired,
            200001 => UserNotFound,
            200002 => UserAlreadyExists,
            200003 => PasswordIncorrect,
            200004 => PasswordTooWeak,
            200005 => EmailAlreadyExists,
            200006 => EmailNotVerified,
            200007 => PhoneAlreadyExists,
            200008 => VerificationCodeError,
            200009 => VerificationCodeExpired,
            210001 => TenantNotFound,
            210002 => TenantDisabled,
            210003 => TenantQuotaExceeded,
            300001 => ConversationNotFound,
            300002 => ConversationLimitExceeded,
            300003 => MessageNotFound,
            300004 => MessageTooLong,
            300005 => ContextTooLong,
            300006 => StreamInterrupted,
            310001 => ModelNotFound,
            310002 => ModelNotAvailable,
            310003 => ModelQuotaExceeded,
            310004 => ModelRateLimited,
            310005 => ModelResponseError,
            400001 => KnowledgeBaseNotFound,
            400002 => KnowledgeBaseLimitExceeded,
            400003 => DocumentNotFound,
            400004 => DocumentParseError,
            400005 => DocumentTooLarge,
            400006 => EmbeddingError,
            400007 => RetrievalError,
            500001 => AgentNotFound,
            500002 => AgentExecutionError,
            500003 => ToolNotFound,
            500004 => ToolExecutionError,
            500005 => WorkflowNotFound,
            500006 => WorkflowExecutionError,
            600001 => FileNotFound,
            600002 => FileTooLarge,
            600003 => FileTypeNotAllowed,
            600004 => FileUploadError,
            600005 => StorageError,
            700001 => ExternalServiceError,
            700002 => LlmApiError,
            700003 => OauthError,
            700004 => WebhookError,
            _ => return None,
        };
        Some(c)
    }
}
