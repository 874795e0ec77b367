//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Landing page
//! GET  /bonus                     - Subscriber bonus page
//!
//! # Popup (HTML fragments for static/js/popup.js)
//! GET  /popup?page=&manual=       - Popup fragment (empty when it must not render)
//! POST /popup/shown               - Exit intent opened the popup (204)
//! POST /popup/close               - Close until the next exit intent
//! POST /popup/dismiss             - Dismiss for the rest of the session
//! POST /popup/subscribe           - Submit the popup form (rate limited)
//!
//! # API
//! POST /api/newsletter/subscribe  - Store a newsletter subscription (JSON)
//! ```

pub mod newsletter;
pub mod pages;
pub mod popup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::subscribe_rate_limiter;
use crate::state::AppState;

/// Create the popup routes router.
pub fn popup_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(popup::show))
        .route("/shown", post(popup::shown))
        .route("/close", post(popup::close))
        .route("/dismiss", post(popup::dismiss))
        .route(
            "/subscribe",
            post(popup::subscribe).layer(subscribe_rate_limiter()),
        )
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/newsletter/subscribe", post(newsletter::subscribe))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/bonus", get(pages::bonus))
        .nest("/popup", popup_routes())
        .nest("/api", api_routes())
}
