//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Site migrations live in `crates/site/migrations/` and are embedded at
//! compile time. The session table belongs to `tower-sessions-sqlx-store`
//! and is created by the store's own migration.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tower_sessions_sqlx_store::PostgresStore;

static SITE_MIGRATIONS: Migrator = sqlx::migrate!("../site/migrations");

/// Errors from migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();

    std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("SITE_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, MigrationError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to site database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Run site database migrations.
///
/// # Errors
///
/// Returns error if the database URL is missing, the connection fails or a
/// migration fails.
pub async fn site() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running site migrations...");
    SITE_MIGRATIONS.run(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Site migrations complete!");
    Ok(())
}

/// Log each embedded site migration with its applied state.
///
/// # Errors
///
/// Returns error if the database URL is missing or the connection fails.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    // The bookkeeping table does not exist before the first run.
    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
        .fetch_all(&pool)
        .await
        .unwrap_or_default();

    for migration in SITE_MIGRATIONS.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            state,
            "site migration"
        );
    }

    Ok(())
}
