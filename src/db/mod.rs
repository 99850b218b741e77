//! Portal database: pool setup and embedded schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! The portal stores users (role claim, onboarding and first-login flags),
//! session tokens and pending email access codes. `PgSessionDirectory`
//! reads the first two on every gated request, so the pool is created and
//! the schema migrated before the listener binds.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::PortalConfig;

/// Connect with the configured pool size and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn connect(config: &PortalConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    tracing::info!(max_connections = config.db_max_connections, "portal schema up to date");

    Ok(pool)
}
