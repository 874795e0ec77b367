//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session only
//! carries popup flags, so it expires after a day of inactivity.

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tp_session";

/// Session expiry time in seconds (1 day).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// How often expired session rows are purged.
const CLEANUP_INTERVAL: tokio::time::Duration = tokio::time::Duration::from_secs(60 * 60);

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by `tp-cli migrate site`.
#[must_use]
pub fn create_session_layer(pool: &PgPool, config: &SiteConfig) -> SessionManagerLayer<PostgresStore> {
    configure(PostgresStore::new(pool.clone()), config)
}

/// Periodically delete expired rows from `tower_sessions.session`.
pub fn spawn_expired_session_cleanup(pool: &PgPool) -> JoinHandle<()> {
    let store = PostgresStore::new(pool.clone());
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(CLEANUP_INTERVAL).await {
            tracing::error!(error = %e, "Expired session cleanup stopped");
        }
    })
}

/// Apply the site's cookie settings to a session layer over any store.
#[must_use]
pub fn configure<S: SessionStore + Clone>(store: S, config: &SiteConfig) -> SessionManagerLayer<S> {
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
