//! Business logic services for the site.
//!
//! # Services
//!
//! - `popup` - Runs the popup state machine against the visitor's session
//! - `storage` - Session-scoped key/value storage
//! - `subscriber` - Client for the newsletter subscription endpoint
//! - `klaviyo` - Forwards stored subscriptions to a Klaviyo list

pub mod klaviyo;
pub mod popup;
pub mod storage;
pub mod subscriber;

pub use klaviyo::{KlaviyoClient, KlaviyoError};
pub use storage::{MemoryStorage, SessionStorage, StorageError};
pub use subscriber::{HttpSubscriber, NewsletterSubscriber, SubscribeError, SubscribeRequest};
