//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to /resources
//! GET  /resources?q=&type=&category=
//!                               - Resource list with search and select filters
//! POST /resources/{id}/delete   - Delete a resource, back to the filtered list
//! GET  /users?q=                - User list with activity summary
//! ```

pub mod resources;
pub mod users;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/resources") }))
        .route("/resources", get(resources::index))
        .route("/resources/{id}/delete", post(resources::delete))
        .route("/users", get(users::index))
}
