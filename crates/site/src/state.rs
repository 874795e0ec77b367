//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::services::{HttpSubscriber, KlaviyoClient, KlaviyoError, SubscribeError};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("subscription client: {0}")]
    Subscriber(#[from] SubscribeError),
    #[error("klaviyo client: {0}")]
    Klaviyo(#[from] KlaviyoError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    subscriber: HttpSubscriber,
    klaviyo: Option<KlaviyoClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, StateError> {
        let subscriber = HttpSubscriber::new(config.subscribe_url.clone())?;
        let klaviyo = config
            .klaviyo
            .as_ref()
            .map(KlaviyoClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                subscriber,
                klaviyo,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the client for the subscription endpoint used by the popup.
    #[must_use]
    pub fn subscriber(&self) -> &HttpSubscriber {
        &self.inner.subscriber
    }

    /// Get the Klaviyo client, if forwarding is configured.
    #[must_use]
    pub fn klaviyo(&self) -> Option<&KlaviyoClient> {
        self.inner.klaviyo.as_ref()
    }
}
