//! Tenant provisioning: slug derivation, unique-slug allocation, creation.

use std::sync::Arc;

use crate::db::{NewTenant, TenantStore};
use crate::error::{AppError, Result};
use crate::models::{default_quotas, Tenant, TenantPlan};

/// Maximum `-N` suffixes tried before giving up. Without a cap a degenerate
/// slug population would spin forever.
const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Maximum slug length.
const MAX_SLUG_LENGTH: usize = 50;

pub struct TenantProvisioner {
    tenants: Arc<dyn TenantStore>,
}

impl TenantProvisioner {
    pub fn new(tenants: Arc<dyn TenantStore>) -> Self {
        Self { tenants }
    }

    /// Derive a URL-safe slug from a display name: lowercase, anything
    /// outside `[a-z0-9-]` becomes `-`, runs of hyphens collapse, leading
    /// and trailing hyphens are trimmed, result truncated to 50 chars.
    pub fn derive_slug(name: &str) -> String {
        let lowered = name.to_lowercase();
        let mut slug = String::with_capacity(lowered.len());
        let mut last_was_hyphen = false;
        for c in lowered.chars() {
            let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            };
            if mapped == '-' {
                if last_was_hyphen {
                    continue;
                }
                last_was_hyphen = true;
            } else {
                last_was_hyphen = false;
            }
            slug.push(mapped);
        }
        let trimmed = slug.trim_matches('-');
        trimmed.chars().take(MAX_SLUG_LENGTH).collect()
    }

    /// Find an unused slug, trying `candidate`, `candidate-1`, `candidate-2`,
    /// ... up to the attempt cap.
    pub async fn allocate_unique_slug(&self, candidate: &str) -> Result<String> {
        if !self.tenants.slug_exists(candidate).await? {
            return Ok(candidate.to_string());
        }
        for counter in 1..=MAX_SLUG_ATTEMPTS {
            let slug = format!("{candidate}-{counter}");
            if !self.tenants.slug_exists(&slug).await? {
                return Ok(slug);
            }
        }
        tracing::error!(candidate, "slug allocation exhausted retry limit");
        Err(AppError::database())
    }

    /// Create a tenant under an unused variant of `slug`, with the quota
    /// table for `plan` copied in.
    pub async fn create_tenant(
        &self,
        name: &str,
        slug: &str,
        plan: TenantPlan,
    ) -> Result<Tenant> {
        let slug = self.allocate_unique_slug(slug).await?;
        let tenant = self
            .tenants
            .create(NewTenant {
                name: name.to_string(),
                slug,
                plan,
                quota: default_quotas(plan),
            })
            .await?;

        tracing::info!(
            tenant_id = %tenant.id,
            tenant_name = %tenant.name,
            slug = %tenant.slug,
            "tenant created"
        );
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryTenantStore;

    fn provisioner() -> (TenantProvisioner, Arc<InMemoryTenantStore>) {
        let store = Arc::new(InMemoryTenantStore::new());
        (TenantProvisioner::new(store.clone()), store)
    }

    #[test]
    fn test_derive_slug_replaces_and_collapses() {
        assert_eq!(TenantProvisioner::derive_slug("John Doe!!"), "john-doe");
        assert_eq!(TenantProvisioner::derive_slug("  -- A --  "), "a");
        assert_eq!(TenantProvisioner::derive_slug("alice"), "alice");
        assert_eq!(TenantProvisioner::derive_slug("a__b..c"), "a-b-c");
    }

    #[test]
    fn test_derive_slug_truncates_to_fifty() {
        let long = "x".repeat(80);
        assert_eq!(TenantProvisioner::derive_slug(&long).len(), 50);
    }

    #[test]
    fn test_derive_slug_all_symbols_is_empty() {
        assert_eq!(TenantProvisioner::derive_slug("!!!"), "");
    }

    #[tokio::test]
    async fn test_allocate_unique_slug_skips_taken() {
        let (provisioner, _store) = provisioner();
        provisioner
            .create_tenant("John", "john", TenantPlan::Free)
            .await
            .unwrap();
        provisioner
            .create_tenant("John 1", "john", TenantPlan::Free)
            .await
            .unwrap();

        // {"john", "john-1"} taken, so "john" allocates as "john-2".
        let slug = provisioner.allocate_unique_slug("john").await.unwrap();
        assert_eq!(slug, "john-2");
    }

    #[tokio::test]
    async fn test_create_tenant_copies_plan_quota() {
        let (provisioner, store) = provisioner();
        let tenant = provisioner
            .create_tenant("Acme", "acme", TenantPlan::Pro)
            .await
            .unwrap();
        assert_eq!(tenant.plan, TenantPlan::Pro);
        assert_eq!(tenant.quota, default_quotas(TenantPlan::Pro));
        assert!(!tenant.quota.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_tenant_free_slug_unchanged() {
        let (provisioner, _store) = provisioner();
        let tenant = provisioner
            .create_tenant("Acme", "acme", TenantPlan::Free)
            .await
            .unwrap();
        assert_eq!(tenant.slug, "acme");
    }
}
