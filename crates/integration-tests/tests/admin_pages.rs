//! Admin list views against a mocked data service.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use tradepath_integration_tests::{DATA_SERVICE_KEY, admin_app, body_string, oneshot};
use wiremock::matchers::{header as header_eq, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORDER_BOOK_ID: &str = "6f9c2d1a-3b4e-4c5d-8e7f-9a0b1c2d3e4f";
const DANA_USER_ID: &str = "0b5e7c1d-9f2a-4e3b-8c6d-1a2b3c4d5e6f";

fn resources() -> serde_json::Value {
    json!([
        {
            "id": ORDER_BOOK_ID,
            "title": "Reading the Order Book",
            "description": "Depth, spread and liquidity",
            "type": "guide",
            "category": "beginner",
            "is_premium": false,
            "download_count": 12,
            "created_at": "2025-03-01T12:00:00Z"
        },
        {
            "id": "a1b2c3d4-e5f6-4a7b-8c9d-0e1f2a3b4c5d",
            "title": "Options Greeks Masterclass",
            "description": null,
            "type": "course",
            "category": "advanced",
            "is_premium": true,
            "download_count": null,
            "created_at": "2025-02-20T09:30:00Z"
        },
        {
            "id": "b2c3d4e5-f6a7-4b8c-9d0e-1f2a3b4c5d6e",
            "title": "Position Size Calculator",
            "type": "tool",
            "created_at": "2025-02-10T15:00:00Z"
        }
    ])
}

async fn mock_resources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/resources"))
        .and(header_eq("apikey", DATA_SERVICE_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(resources()))
        .mount(server)
        .await;
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String) {
    let response = oneshot(app, Request::get(uri).body(Body::empty()).unwrap()).await;
    let status = response.status();
    (status, body_string(response).await)
}

// =============================================================================
// Resources
// =============================================================================

#[tokio::test]
async fn test_root_redirects_to_resources() {
    let server = MockServer::start().await;
    let response = oneshot(
        &admin_app(&server.uri()),
        Request::get("/").body(Body::empty()).unwrap(),
    )
    .await;

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/resources")
    );
}

#[tokio::test]
async fn test_resources_list_all() {
    let server = MockServer::start().await;
    mock_resources(&server).await;

    let (status, html) = get(&admin_app(&server.uri()), "/resources").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Reading the Order Book"));
    assert!(html.contains("Options Greeks Masterclass"));
    assert!(html.contains("Position Size Calculator"));
    assert!(html.contains("Resources (3)"));
    assert!(html.contains("badge--green"), "guide/beginner badges");
    assert!(html.contains("badge--blue"), "course badge");
    assert_eq!(html.matches(r#"badge--outline">Free<"#).count(), 2, "only free resources");
}

#[tokio::test]
async fn test_resources_search_is_case_insensitive() {
    let server = MockServer::start().await;
    mock_resources(&server).await;

    let (_, html) = get(&admin_app(&server.uri()), "/resources?q=LIQUIDITY").await;
    assert!(html.contains("Reading the Order Book"), "matches description");
    assert!(!html.contains("Options Greeks Masterclass"));
    assert!(html.contains("Resources (1 of 3)"));
}

#[tokio::test]
async fn test_resources_type_and_category_filters() {
    let server = MockServer::start().await;
    mock_resources(&server).await;
    let app = admin_app(&server.uri());

    let (_, html) = get(&app, "/resources?type=course&category=all").await;
    assert!(html.contains("Options Greeks Masterclass"));
    assert!(!html.contains("Reading the Order Book"));

    let (_, html) = get(&app, "/resources?type=all&category=tools").await;
    assert!(
        !html.contains("Position Size Calculator"),
        "missing category never matches an active category filter"
    );
    assert!(html.contains("No resources found matching your filters."));
}

#[tokio::test]
async fn test_resources_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (_, html) = get(&admin_app(&server.uri()), "/resources").await;
    assert!(html.contains("No resources available yet."));
    assert!(!html.contains("Could not load resources"));
}

#[tokio::test]
async fn test_resources_fetch_failure_shows_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resources"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (status, html) = get(&admin_app(&server.uri()), "/resources").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Could not load resources"));
    assert!(html.contains("No resources available yet."));
}

#[tokio::test]
async fn test_delete_resource_keeps_filters() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/resources"))
        .and(query_param("id", format!("eq.{ORDER_BOOK_ID}").as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::post(format!("/resources/{ORDER_BOOK_ID}/delete"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("q=order&type=guide&category=all"))
        .unwrap();
    let response = oneshot(&admin_app(&server.uri()), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/resources?q=order&type=guide")
    );
}

#[tokio::test]
async fn test_delete_failure_still_returns_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::post(format!("/resources/{ORDER_BOOK_ID}/delete"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    let response = oneshot(&admin_app(&server.uri()), request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some("/resources")
    );
}

#[tokio::test]
async fn test_delete_rejects_malformed_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::post("/resources/not-a-uuid/delete")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap();
    let response = oneshot(&admin_app(&server.uri()), request).await;

    assert!(response.status().is_client_error());
}

// =============================================================================
// Users
// =============================================================================

async fn mock_users(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "7a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
                "user_id": DANA_USER_ID,
                "full_name": "Dana Reyes",
                "primary_interest": "Options",
                "trading_experience": "advanced",
                "phone_number": "+1 555 0100",
                "is_admin": true,
                "created_at": "2025-01-15T08:00:00Z"
            },
            {
                "id": "8b2c3d4e-5f6a-4b7c-9d8e-0f1a2b3c4d5e",
                "user_id": "9c3d4e5f-6a7b-4c8d-8e9f-1a2b3c4d5e6f",
                "full_name": null,
                "primary_interest": "Futures",
                "is_admin": false,
                "created_at": "2025-01-20T08:00:00Z"
            }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_users_list_with_activity() {
    let server = MockServer::start().await;
    mock_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
                "user_id": DANA_USER_ID,
                "activity_type": "download",
                "created_at": "2025-02-03T10:00:00Z"
            },
            {
                "id": "2d3e4f5a-6b7c-4d8e-9f0a-1b2c3d4e5f6a",
                "user_id": DANA_USER_ID,
                "activity_type": "login",
                "created_at": "2025-01-28T10:00:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let (status, html) = get(&admin_app(&server.uri()), "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Dana Reyes"));
    assert!(html.contains("Anonymous User"));
    assert!(html.contains("badge--destructive"), "admin role badge");
    assert!(html.contains("Feb 3, 2025"), "latest activity wins");
    assert!(html.contains("Never"));
    assert!(html.contains("Users (2)"));
}

#[tokio::test]
async fn test_users_search() {
    let server = MockServer::start().await;
    mock_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let app = admin_app(&server.uri());

    let (_, html) = get(&app, "/users?q=futures").await;
    assert!(html.contains("Anonymous User"));
    assert!(!html.contains("Dana Reyes"));

    let (_, html) = get(&app, "/users?q=nobody").await;
    assert!(html.contains("No users found matching your search."));
}

#[tokio::test]
async fn test_users_activity_failure_keeps_list() {
    let server = MockServer::start().await;
    mock_users(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_activities"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_, html) = get(&admin_app(&server.uri()), "/users").await;
    assert!(html.contains("Dana Reyes"));
    assert!(!html.contains("Could not load users"));
}

#[tokio::test]
async fn test_users_fetch_failure_shows_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (_, html) = get(&admin_app(&server.uri()), "/users").await;
    assert!(html.contains("Could not load users"));
    assert!(html.contains("No users registered yet."));
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_admin_health_and_not_found() {
    let server = MockServer::start().await;
    let app = admin_app(&server.uri());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = get(&app, "/orders").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
