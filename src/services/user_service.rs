//! Identity service: registration and authentication.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{NewUser, TenantStore, UserStore};
use crate::error::{AppError, FieldError, Result};
use crate::error_codes::ErrorCode;
use crate::models::{Tenant, TenantPlan, User};
use crate::security::password::{check_password_strength, hash_password, verify_password};
use crate::services::tenant_service::TenantProvisioner;

/// Registration input, already shape-validated at the boundary.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub tenant_name: Option<String>,
}

pub struct IdentityService {
    users: Arc<dyn UserStore>,
    tenants: Arc<dyn TenantStore>,
    provisioner: TenantProvisioner,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, tenants: Arc<dyn TenantStore>) -> Self {
        let provisioner = TenantProvisioner::new(tenants.clone());
        Self {
            users,
            tenants,
            provisioner,
        }
    }

    /// Register a new user, creating its tenant first.
    ///
    /// Fail-fast and write-free on every policy violation: nothing is
    /// persisted until the email and password checks have passed.
    pub async fn register(
        &self,
        data: RegisterUser,
        create_tenant: bool,
    ) -> Result<(User, Tenant)> {
        if self.users.email_exists(&data.email).await? {
            return Err(AppError::conflict(
                ErrorCode::EmailAlreadyExists,
                "Email is already registered",
            ));
        }

        if let Err(reason) = check_password_strength(&data.password) {
            return Err(AppError::validation(
                reason,
                vec![FieldError::new("password", reason)],
            ));
        }

        // Joining an existing tenant is not supported yet.
        if !create_tenant {
            return Err(AppError::validation(
                "Registration currently requires creating a new tenant",
                Vec::new(),
            ));
        }

        let tenant_name = data
            .tenant_name
            .clone()
            .unwrap_or_else(|| format!("{}'s workspace", data.username));
        let slug = TenantProvisioner::derive_slug(&data.username);
        let tenant = self
            .provisioner
            .create_tenant(&tenant_name, &slug, TenantPlan::Free)
            .await?;

        // Unreachable for a freshly created tenant, kept as an invariant
        // check against concurrent writers.
        if self
            .users
            .username_exists_in_tenant(&data.username, tenant.id)
            .await?
        {
            return Err(AppError::conflict(
                ErrorCode::UserAlreadyExists,
                "Username already exists in this tenant",
            ));
        }

        // bcrypt is CPU-heavy; keep it off the async worker threads.
        let password = data.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .users
            .create(NewUser {
                tenant_id: tenant.id,
                email: data.email,
                username: data.username,
                password_hash: Some(password_hash),
                full_name: data.full_name,
                is_active: true,
                // The first user of a new tenant owns it.
                is_superuser: true,
                is_verified: false,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            tenant_id = %tenant.id,
            "user registered"
        );

        Ok((user, tenant))
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password produce the identical error so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        client_ip: Option<&str>,
    ) -> Result<User> {
        let user = match self.users.get_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(email, ip = client_ip, "login failed: user not found");
                return Err(Self::bad_credentials());
            }
        };

        let verified = match user.password_hash.clone() {
            Some(hash) => {
                let password = password.to_string();
                tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
            }
            None => false,
        };
        if !verified {
            tracing::warn!(email, ip = client_ip, "login failed: wrong password");
            return Err(Self::bad_credentials());
        }

        if !user.is_active {
            tracing::warn!(email, ip = client_ip, "login failed: account disabled");
            return Err(AppError::authentication(ErrorCode::AccountDisabled));
        }

        let tenant = self
            .tenants
            .get_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found_coded(ErrorCode::TenantNotFound, "tenant"))?;
        if !tenant.is_active() {
            tracing::warn!(email, ip = client_ip, "login failed: tenant disabled");
            return Err(AppError::authentication_with(
                ErrorCode::TenantDisabled,
                "Owning tenant has been disabled",
            ));
        }

        let user = self
            .users
            .record_login(user.id, Utc::now(), client_ip)
            .await?;

        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            ip = client_ip,
            "user logged in"
        );

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found_coded(ErrorCode::UserNotFound, "user"))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found_coded(ErrorCode::UserNotFound, "user"))
    }

    fn bad_credentials() -> AppError {
        AppError::authentication_with(ErrorCode::PasswordIncorrect, "Incorrect email or password")
    }
}
