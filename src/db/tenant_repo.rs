//! Postgres-backed tenant store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::{NewTenant, TenantStore};
use crate::error::Result;
use crate::models::{Tenant, TenantStatus};

const TENANT_COLUMNS: &str = "id, name, slug, description, plan, status, settings, quota, \
     expire_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tenants WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, fields: NewTenant) -> Result<Tenant> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let settings: HashMap<String, serde_json::Value> = HashMap::new();

        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "INSERT INTO tenants \
                 (id, name, slug, plan, status, settings, quota, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(fields.plan.as_str())
        .bind(TenantStatus::Active.as_str())
        .bind(Json(settings))
        .bind(Json(&fields.quota))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(tenant)
    }
}
