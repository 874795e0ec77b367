//! Newsletter subscription storage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use tradepath_core::Email;

use super::RepositoryError;

/// Insert a subscription, or refresh it if the address is already known.
///
/// Returns how many times the address has been submitted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails, or
/// `RepositoryError::DataCorruption` if the stored count is not positive.
#[instrument(skip(pool), fields(email = %email))]
pub async fn upsert_subscription(
    pool: &PgPool,
    email: &Email,
    source: &str,
    page: Option<&str>,
    subscribed_at: DateTime<Utc>,
) -> Result<i32, RepositoryError> {
    let count: i32 = sqlx::query_scalar(
        r"
        INSERT INTO site.newsletter_subscription (email, source, page, subscribed_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET source = EXCLUDED.source,
            page = EXCLUDED.page,
            last_submitted_at = EXCLUDED.subscribed_at,
            submission_count = site.newsletter_subscription.submission_count + 1
        RETURNING submission_count
        ",
    )
    .bind(email)
    .bind(source)
    .bind(page)
    .bind(subscribed_at)
    .fetch_one(pool)
    .await?;

    if count < 1 {
        return Err(RepositoryError::DataCorruption(format!(
            "submission_count {count} for {email}"
        )));
    }

    Ok(count)
}
