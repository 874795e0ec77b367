//! Client for the remote data service that owns resources and profiles.
//!
//! The service speaks the PostgREST dialect: tables live under `/rest/v1`,
//! filters are query parameters (`id=eq.<uuid>`) and the API key is sent
//! both as `apikey` and as a bearer token. Every call is a single request
//! with no retry; callers decide how to degrade.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use tradepath_core::{Activity, Profile, Resource, ResourceId};

use crate::config::DataServiceConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when talking to the data service.
#[derive(Debug, Error)]
pub enum DataServiceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected rows.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// REST client for the remote data service.
#[derive(Debug, Clone)]
pub struct RestDataService {
    client: reqwest::Client,
    rest_url: String,
}

impl RestDataService {
    /// Create a new data service client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &DataServiceConfig) -> Result<Self, DataServiceError> {
        let key = config.key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| DataServiceError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| DataServiceError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    /// All resources, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rows cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_resources(&self) -> Result<Vec<Resource>, DataServiceError> {
        self.select("resources").await
    }

    /// All user profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rows cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<Vec<Profile>, DataServiceError> {
        self.select("profiles").await
    }

    /// All user activity records, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the rows cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_activities(&self) -> Result<Vec<Activity>, DataServiceError> {
        self.select("user_activities").await
    }

    /// Delete one resource by id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service rejects it.
    #[instrument(skip(self), fields(resource_id = %id))]
    pub async fn delete_resource(&self, id: ResourceId) -> Result<(), DataServiceError> {
        let url = format!("{}/resources", self.rest_url);
        let response = self
            .client
            .delete(&url)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn select<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, DataServiceError> {
        let url = format!("{}/{table}", self.rest_url);
        let response = self
            .client
            .get(&url)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| DataServiceError::Parse(format!("{table}: {e}")))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DataServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(DataServiceError::Api {
        status: status.as_u16(),
        message,
    })
}
