//! Identity and tenant provisioning service.
//!
//! Registration, login, tenant bootstrap with per-plan quotas, and token
//! issuance, exposed over an HTTP API with a uniform response envelope and a
//! numeric error taxonomy.

pub mod config;
pub mod db;
pub mod error;
pub mod error_codes;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod security;
pub mod services;

pub use config::Settings;
pub use error::{AppError, Result};
pub use error_codes::ErrorCode;
pub use services::{IdentityService, TenantProvisioner};
