//! Tenant model.
//!
//! The tenant is the top-level isolation and billing unit: it owns users,
//! settings and quotas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// Subscription plan. Quota defaults are keyed by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantPlan {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl TenantPlan {
    pub fn as_str(self) -> &'static str {
        match self {
            TenantPlan::Free => "free",
            TenantPlan::Basic => "basic",
            TenantPlan::Pro => "pro",
            TenantPlan::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(TenantPlan::Free),
            "basic" => Some(TenantPlan::Basic),
            "pro" => Some(TenantPlan::Pro),
            "enterprise" => Some(TenantPlan::Enterprise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    Expired,
}

impl TenantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TenantStatus::Active),
            "suspended" => Some(TenantStatus::Suspended),
            "expired" => Some(TenantStatus::Expired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub plan: TenantPlan,
    pub status: TenantStatus,
    pub settings: HashMap<String, serde_json::Value>,
    /// Per-feature integer limits; -1 means unlimited. Always populated from
    /// the plan's default table at creation.
    pub quota: HashMap<String, i64>,
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    pub fn is_expired(&self) -> bool {
        match self.expire_at {
            Some(at) => Utc::now() > at,
            None => false,
        }
    }

    pub fn quota_for(&self, key: &str) -> i64 {
        self.quota.get(key).copied().unwrap_or(0)
    }
}

// Plan and status are stored as text, quota and settings as jsonb; decode by
// hand rather than leaning on Postgres enum types.
impl FromRow<'_, PgRow> for Tenant {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let plan_raw: String = row.try_get("plan")?;
        let plan = TenantPlan::parse(&plan_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "plan".into(),
            source: format!("unknown tenant plan: {plan_raw}").into(),
        })?;

        let status_raw: String = row.try_get("status")?;
        let status = TenantStatus::parse(&status_raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown tenant status: {status_raw}").into(),
        })?;

        let settings: sqlx::types::Json<HashMap<String, serde_json::Value>> =
            row.try_get("settings")?;
        let quota: sqlx::types::Json<HashMap<String, i64>> = row.try_get("quota")?;

        Ok(Tenant {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            plan,
            status,
            settings: settings.0,
            quota: quota.0,
            expire_at: row.try_get("expire_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Default quota table, copied into the tenant at creation.
pub fn default_quotas(plan: TenantPlan) -> HashMap<String, i64> {
    let entries: [(&str, i64); 7] = match plan {
        TenantPlan::Free => [
            ("max_users", 3),
            ("max_conversations", 100),
            ("max_messages_per_day", 50),
            ("max_knowledge_bases", 1),
            ("max_documents", 10),
            ("max_document_size_mb", 10),
            ("max_agents", 1),
        ],
        TenantPlan::Basic => [
            ("max_users", 10),
            ("max_conversations", 1000),
            ("max_messages_per_day", 500),
            ("max_knowledge_bases", 5),
            ("max_documents", 100),
            ("max_document_size_mb", 50),
            ("max_agents", 5),
        ],
        TenantPlan::Pro => [
            ("max_users", 50),
            ("max_conversations", 10000),
            ("max_messages_per_day", 5000),
            ("max_knowledge_bases", 20),
            ("max_documents", 500),
            ("max_document_size_mb", 100),
            ("max_agents", 20),
        ],
        TenantPlan::Enterprise => [
            ("max_users", -1),
            ("max_conversations", -1),
            ("max_messages_per_day", -1),
            ("max_knowledge_bases", -1),
            ("max_documents", -1),
            ("max_document_size_mb", 500),
            ("max_agents", -1),
        ],
    };
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
