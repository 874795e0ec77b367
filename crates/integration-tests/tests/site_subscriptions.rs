//! Newsletter API against a real database.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `SITE_DATABASE_URL` (or `DATABASE_URL`). Migrations are applied on setup.
//!
//! Run with: cargo test -p tradepath-integration-tests -- --ignored

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tradepath_integration_tests::{body_string, oneshot, site_app_with_pool, site_config};
use uuid::Uuid;

static SITE_MIGRATIONS: Migrator = sqlx::migrate!("../site/migrations");

async fn database() -> PgPool {
    let url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("SITE_DATABASE_URL or DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("Failed to connect to database");
    SITE_MIGRATIONS.run(&pool).await.expect("Failed to run migrations");
    pool
}

fn subscribe(email: &str, page: &str) -> Request<Body> {
    let body = serde_json::json!({
        "email": email,
        "source": "exit_intent_popup",
        "page": page,
    });
    Request::post("/api/newsletter/subscribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn stored(pool: &PgPool, email: &str) -> (i32, String, Option<String>) {
    sqlx::query_as(
        "SELECT submission_count, source, page FROM site.newsletter_subscription WHERE email = $1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_subscribe_stores_and_counts_resubmissions() {
    let pool = database().await;
    let app = site_app_with_pool(site_config("http://127.0.0.1:9"), pool.clone());
    let email = format!("lead-{}@example.com", Uuid::new_v4().simple());

    let response = oneshot(&app, subscribe(&email, "/pricing")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body, serde_json::json!({ "subscribed": true }));
    assert_eq!(
        stored(&pool, &email).await,
        (1, "exit_intent_popup".to_string(), Some("/pricing".to_string()))
    );

    let response = oneshot(&app, subscribe(&email, "/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["subscribed"], true);
    assert_eq!(
        stored(&pool, &email).await,
        (2, "exit_intent_popup".to_string(), Some("/".to_string()))
    );

    sqlx::query("DELETE FROM site.newsletter_subscription WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_subscribe_normalises_email() {
    let pool = database().await;
    let app = site_app_with_pool(site_config("http://127.0.0.1:9"), pool.clone());
    let local = format!("lead-{}", Uuid::new_v4().simple());
    let email = format!("{local}@example.com");

    let input = format!("  {}@Example.COM ", local.to_uppercase());

    let response = oneshot(&app, subscribe(&input, "/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stored(&pool, &email).await.0, 1);

    sqlx::query("DELETE FROM site.newsletter_subscription WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();
}
