//! Postgres-backed user store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{NewUser, UserStore};
use crate::error::Result;
use crate::models::User;

const USER_COLUMNS: &str = "id, tenant_id, email, username, password_hash, full_name, \
     avatar_url, phone, is_active, is_superuser, is_verified, \
     last_login_at, last_login_ip, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_username_in_tenant(
        &self,
        username: &str,
        tenant_id: Uuid,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND tenant_id = $2"
        ))
        .bind(username)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.to_lowercase())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn username_exists_in_tenant(&self, username: &str, tenant_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND tenant_id = $2)",
        )
        .bind(username)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, fields: NewUser) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
                 (id, tenant_id, email, username, password_hash, full_name, \
                  is_active, is_superuser, is_verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.tenant_id)
        .bind(fields.email.to_lowercase())
        .bind(&fields.username)
        .bind(&fields.password_hash)
        .bind(&fields.full_name)
        .bind(fields.is_active)
        .bind(fields.is_superuser)
        .bind(fields.is_verified)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn record_login(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET last_login_at = $2, last_login_ip = $3, updated_at = $2 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(at)
        .bind(ip)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
