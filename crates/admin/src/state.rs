//! Application state shared across admin handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::services::{DataServiceError, RestDataService};

/// Shared application state.
///
/// Cheap to clone; the inner data lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    data: RestDataService,
}

impl AppState {
    /// Build the state and its data service client.
    ///
    /// # Errors
    ///
    /// Returns error if the data service client cannot be created.
    pub fn new(config: AdminConfig) -> Result<Self, DataServiceError> {
        let data = RestDataService::new(&config.data_service)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, data }),
        })
    }

    /// Admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Remote data service client.
    #[must_use]
    pub fn data(&self) -> &RestDataService {
        &self.inner.data
    }
}
