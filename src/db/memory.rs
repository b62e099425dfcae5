//! In-memory store implementations.
//!
//! Used by the test suite and for running the service without a database.
//! They enforce the same uniqueness rules as the Postgres schema so service
//! tests see the same conflicts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::db::{NewTenant, NewUser, TenantStore, UserStore};
use crate::error::{AppError, Result};
use crate::error_codes::ErrorCode;
use crate::models::{Tenant, TenantStatus, User};

// The data behind these locks stays consistent even if a holder panicked
// mid-test, so poisoning is recovered rather than propagated.
fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users; used by tests to assert write-free failures.
    pub fn len(&self) -> usize {
        read_guard(&self.users).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = read_guard(&self.users);
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        let users = read_guard(&self.users);
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_username_in_tenant(
        &self,
        username: &str,
        tenant_id: Uuid,
    ) -> Result<Option<User>> {
        let users = read_guard(&self.users);
        Ok(users
            .iter()
            .find(|u| u.username == username && u.tenant_id == tenant_id)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    async fn username_exists_in_tenant(&self, username: &str, tenant_id: Uuid) -> Result<bool> {
        Ok(self
            .get_by_username_in_tenant(username, tenant_id)
            .await?
            .is_some())
    }

    async fn create(&self, fields: NewUser) -> Result<User> {
        let mut users = write_guard(&self.users);
        let email = fields.email.to_lowercase();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::conflict(
                ErrorCode::EmailAlreadyExists,
                "Email is already registered",
            ));
        }
        if users
            .iter()
            .any(|u| u.username == fields.username && u.tenant_id == fields.tenant_id)
        {
            return Err(AppError::conflict(
                ErrorCode::UserAlreadyExists,
                "Username already exists in this tenant",
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            tenant_id: fields.tenant_id,
            email,
            username: fields.username,
            password_hash: fields.password_hash,
            full_name: fields.full_name,
            avatar_url: None,
            phone: None,
            is_active: fields.is_active,
            is_superuser: fields.is_superuser,
            is_verified: fields.is_verified,
            last_login_at: None,
            last_login_ip: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn record_login(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<User> {
        let mut users = write_guard(&self.users);
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::not_found_coded(ErrorCode::UserNotFound, "user"))?;
        user.last_login_at = Some(at);
        user.last_login_ip = ip.map(|s| s.to_string());
        user.updated_at = at;
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct InMemoryTenantStore {
    tenants: RwLock<Vec<Tenant>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read_guard(&self.tenants).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flip a tenant's status; test helper.
    pub fn set_status(&self, tenant_id: Uuid, status: TenantStatus) {
        let mut tenants = write_guard(&self.tenants);
        if let Some(t) = tenants.iter_mut().find(|t| t.id == tenant_id) {
            t.status = status;
        }
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        let tenants = read_guard(&self.tenants);
        Ok(tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let tenants = read_guard(&self.tenants);
        Ok(tenants.iter().find(|t| t.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }

    async fn create(&self, fields: NewTenant) -> Result<Tenant> {
        let mut tenants = write_guard(&self.tenants);
        if tenants.iter().any(|t| t.slug == fields.slug) {
            return Err(AppError::conflict(
                ErrorCode::UserAlreadyExists,
                "Tenant slug already exists",
            ));
        }
        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: fields.name,
            slug: fields.slug,
            description: None,
            plan: fields.plan,
            status: TenantStatus::Active,
            settings: HashMap::new(),
            quota: fields.quota,
            expire_at: None,
            created_at: now,
            updated_at: now,
        };
        tenants.push(tenant.clone());
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_quotas, TenantPlan};

    fn new_user(email: &str, username: &str, tenant_id: Uuid) -> NewUser {
        NewUser {
            tenant_id,
            email: email.to_string(),
            username: username.to_string(),
            password_hash: Some("hash".to_string()),
            full_name: None,
            is_active: true,
            is_superuser: false,
            is_verified: false,
        }
    }

    #[tokio::test]
    async fn test_email_unique_across_tenants() {
        let store = InMemoryUserStore::new();
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();
        store.create(new_user("a@b.com", "alice", t1)).await.unwrap();
        let err = store
            .create(new_user("A@B.com", "alice2", t2))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailAlreadyExists);
    }

    #[tokio::test]
    async fn test_username_unique_per_tenant_only() {
        let store = InMemoryUserStore::new();
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();
        store.create(new_user("a@b.com", "alice", t1)).await.unwrap();
        // Same username in another tenant is fine.
        store.create(new_user("c@d.com", "alice", t2)).await.unwrap();
        let err = store
            .create(new_user("e@f.com", "alice", t1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserAlreadyExists);
    }

    #[tokio::test]
    async fn test_slug_unique() {
        let store = InMemoryTenantStore::new();
        let fields = NewTenant {
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            plan: TenantPlan::Free,
            quota: default_quotas(TenantPlan::Free),
        };
        store.create(fields.clone()).await.unwrap();
        let err = store.create(fields).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserAlreadyExists);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_recovered() {
        let store = InMemoryUserStore::new();
        store
            .create(new_user("a@b.com", "alice", Uuid::new_v4()))
            .await
            .unwrap();

        // Panic while holding the write lock to poison it.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.users.write().unwrap();
            panic!("poison");
        }));
        assert!(result.is_err());

        assert_eq!(store.len(), 1);
        assert!(store.get_by_email("a@b.com").await.unwrap().is_some());
        store
            .create(new_user("c@d.com", "carol", Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_record_login() {
        let store = InMemoryUserStore::new();
        let user = store
            .create(new_user("a@b.com", "alice", Uuid::new_v4()))
            .await
            .unwrap();
        let now = Utc::now();
        let updated = store
            .record_login(user.id, now, Some("10.1.2.3"))
            .await
            .unwrap();
        assert_eq!(updated.last_login_at, Some(now));
        assert_eq!(updated.last_login_ip.as_deref(), Some("10.1.2.3"));
    }
}
