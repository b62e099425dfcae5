use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use identity_service::config::Settings;
use identity_service::db::tenant_repo::PgTenantStore;
use identity_service::db::user_repo::PgUserStore;
use identity_service::db::{TenantStore, UserStore};
use identity_service::routes::configure_routes;
use identity_service::security::jwt::TokenIssuer;
use identity_service::services::IdentityService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "identity_service=info,info".into()),
        )
        .with_target(false)
        .init();

    info!("Starting identity service");

    let settings = Settings::from_env().context("Failed to load configuration")?;

    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool.clone()));
    let tenants: Arc<dyn TenantStore> = Arc::new(PgTenantStore::new(db_pool));
    let identity = web::Data::new(IdentityService::new(users, tenants));

    let token_issuer = web::Data::new(
        TokenIssuer::from_config(&settings.jwt).context("Failed to initialize token issuer")?,
    );

    let bind_addr = (settings.server.host.clone(), settings.server.port);
    info!("Starting HTTP server on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(identity.clone())
            .app_data(token_issuer.clone())
            .configure(configure_routes)
    })
    .bind(bind_addr)
    .context("Failed to bind server address")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("Identity service shutdown complete");
    Ok(())
}
