pub mod tenant_service;
pub mod user_service;

pub use tenant_service::TenantProvisioner;
pub use user_service::{IdentityService, RegisterUser};
