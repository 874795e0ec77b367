//! Client for the newsletter subscription endpoint.
//!
//! The popup posts `{ email, source, page, timestamp }` as JSON. Any 2xx
//! answer counts as success; other statuses and transport failures are
//! reported as [`SubscribeError`].

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tradepath_core::Email;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the subscription endpoint.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// Request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status.
    #[error("subscription endpoint returned {status}")]
    Status { status: u16 },
}

/// JSON body of a subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeRequest {
    pub email: Email,
    pub source: String,
    pub page: String,
    pub timestamp: DateTime<Utc>,
}

impl SubscribeRequest {
    /// Build a request stamped with the current time.
    #[must_use]
    pub fn now(email: Email, source: &str, page: &str) -> Self {
        Self {
            email,
            source: source.to_string(),
            page: page.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Something that accepts newsletter subscriptions.
pub trait NewsletterSubscriber: Send + Sync {
    fn subscribe(
        &self,
        request: &SubscribeRequest,
    ) -> impl Future<Output = Result<(), SubscribeError>> + Send;
}

/// Posts subscriptions to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubscriber {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubscriber {
    /// Create a subscriber posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SubscribeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl NewsletterSubscriber for HttpSubscriber {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<(), SubscribeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubscribeError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request() -> SubscribeRequest {
        SubscribeRequest::now(
            Email::parse("lead@example.com").unwrap(),
            "exit_intent_popup",
            "/pricing",
        )
    }

    #[tokio::test]
    async fn test_subscribe_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/newsletter/subscribe"))
            .and(body_partial_json(serde_json::json!({
                "email": "lead@example.com",
                "source": "exit_intent_popup",
                "page": "/pricing",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let subscriber =
            HttpSubscriber::new(format!("{}/api/newsletter/subscribe", server.uri())).unwrap();

        subscriber.subscribe(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_any_2xx_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let subscriber = HttpSubscriber::new(server.uri()).unwrap();
        assert!(subscriber.subscribe(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let subscriber = HttpSubscriber::new(server.uri()).unwrap();
        let err = subscriber.subscribe(&request()).await.unwrap_err();
        assert!(matches!(err, SubscribeError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn test_network_failure_is_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let subscriber = HttpSubscriber::new("http://127.0.0.1:9/subscribe").unwrap();
        let err = subscriber.subscribe(&request()).await.unwrap_err();
        assert!(matches!(err, SubscribeError::Http(_)));
    }
}
