//! Persistence collaborators.
//!
//! The service layer talks to narrow store traits; `user_repo`/`tenant_repo`
//! back them with Postgres, `memory` backs them with in-process maps for
//! tests and local development. Schema management lives outside this crate.

pub mod memory;
pub mod tenant_repo;
pub mod user_repo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Tenant, TenantPlan, User};

/// Fields for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

/// Fields for inserting a tenant.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub plan: TenantPlan,
    pub quota: HashMap<String, i64>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_by_username_in_tenant(
        &self,
        username: &str,
        tenant_id: Uuid,
    ) -> Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> Result<bool>;
    async fn username_exists_in_tenant(&self, username: &str, tenant_id: Uuid) -> Result<bool>;
    async fn create(&self, fields: NewUser) -> Result<User>;
    /// Stamp a successful login on the user record.
    async fn record_login(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<User>;
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>>;
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
    async fn create(&self, fields: NewTenant) -> Result<Tenant>;
}
