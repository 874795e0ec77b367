//! Site pages, health checks and the newsletter API.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tradepath_integration_tests::{Browser, body_string, oneshot, site_app, site_config};

fn app() -> axum::Router {
    site_app(site_config("http://127.0.0.1:9"))
}

fn json_post(body: &str) -> Request<Body> {
    Request::post("/api/newsletter/subscribe")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = oneshot(&app(), Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let response = oneshot(
        &app(),
        Request::get("/health/ready").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let request = Request::get("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = oneshot(&app(), request).await;
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-123")
    );
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_home_embeds_closed_popup() {
    let mut browser = Browser::new(app(), "192.0.2.1");
    let response = browser.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(r#"id="exit-popup""#));
    assert!(html.contains("data-popup-trigger"));
    assert!(html.contains("hidden"));
}

#[tokio::test]
async fn test_page_views_do_not_start_a_session() {
    let mut browser = Browser::new(app(), "192.0.2.4");

    for path in ["/", "/bonus", "/"] {
        let response = browser.get(path).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            !response.headers().contains_key(header::SET_COOKIE),
            "{path} set a session cookie"
        );
    }
    assert!(!browser.has_session());
}

#[tokio::test]
async fn test_bonus_page_has_no_popup() {
    let mut browser = Browser::new(app(), "192.0.2.2");
    let response = browser.get("/bonus").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(!html.contains(r#"id="exit-popup""#));
}

#[tokio::test]
async fn test_disabled_popup_not_embedded() {
    let mut config = site_config("http://127.0.0.1:9");
    config.popup.enabled = false;
    let mut browser = Browser::new(site_app(config), "192.0.2.3");

    let html = body_string(browser.get("/").await).await;
    assert!(!html.contains(r#"id="exit-popup""#));

    let fragment = body_string(browser.get("/popup?page=/&manual=true").await).await;
    assert!(fragment.trim().is_empty(), "manual trigger cannot enable a disabled popup");
}

// =============================================================================
// Newsletter API
// =============================================================================

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let response = oneshot(&app(), json_post(r#"{"email":"not-an-email"}"#)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "Please enter a valid email address.");
}

#[tokio::test]
async fn test_newsletter_hides_database_errors() {
    let response = oneshot(
        &app(),
        json_post(r#"{"email":"lead@example.com","source":"exit_intent_popup","page":"/"}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_string(response).await;
    assert!(body.contains("Internal server error"));
    assert!(!body.contains("127.0.0.1"));
}

#[tokio::test]
async fn test_newsletter_requires_json_email() {
    let response = oneshot(&app(), json_post(r#"{"source":"website"}"#)).await;
    assert!(response.status().is_client_error());
}
