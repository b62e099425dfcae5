pub mod tenant;
pub mod user;

pub use tenant::{default_quotas, Tenant, TenantPlan, TenantStatus};
pub use user::{User, UserView};
