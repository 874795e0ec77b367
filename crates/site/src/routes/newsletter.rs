//! Newsletter subscription API.
//!
//! `POST /api/newsletter/subscribe` is the endpoint the popup submits to.
//! The lead is stored locally first; forwarding to Klaviyo is best-effort.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use tradepath_core::Email;

use crate::db;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Source recorded when the client does not send one.
const DEFAULT_SOURCE: &str = "website";
const MAX_FIELD_LEN: usize = 512;

/// Subscription request body.
#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Subscription response body.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
}

fn clean(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_FIELD_LEN)
}

/// Subscribe an email address.
///
/// # Errors
///
/// Returns 400 for an invalid email and 500 if the subscription cannot be
/// stored. A Klaviyo failure is logged and does not fail the request.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<SubscribeResponse>> {
    let email = Email::parse(&body.email).map_err(|e| {
        tracing::debug!(error = %e, "Rejected newsletter email");
        AppError::BadRequest("Please enter a valid email address.".to_string())
    })?;

    let source = clean(body.source.as_deref()).unwrap_or(DEFAULT_SOURCE);
    let page = clean(body.page.as_deref());
    let subscribed_at = body.timestamp.unwrap_or_else(Utc::now);

    let submissions =
        db::upsert_subscription(state.pool(), &email, source, page, subscribed_at).await?;
    tracing::info!(
        source,
        page = page.unwrap_or(""),
        submissions,
        "Newsletter subscription stored"
    );

    if let Some(klaviyo) = state.klaviyo()
        && let Err(e) = klaviyo.subscribe_email(&email, source).await
    {
        tracing::warn!(error = %e, "Klaviyo subscription failed");
    }

    Ok(Json(SubscribeResponse { subscribed: true }))
}
