//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on `/popup/subscribe` (governor)

pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use rate_limit::subscribe_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, spawn_expired_session_cleanup};
