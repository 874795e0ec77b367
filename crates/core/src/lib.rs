//! Tradepath Core - Shared types and view logic.
//!
//! This crate provides the types and pure logic used by the Tradepath
//! binaries:
//! - `site` - Public marketing site with the exit-intent popup
//! - `admin` - Internal administration panel (resources, users)
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. The popup state machine and the admin
//! list filters live here so both can be tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`resource`] - Learning resources managed from the admin panel
//! - [`profile`] - User profiles and activity records
//! - [`filter`] - Derived filtered views over fetched collections
//! - [`popup`] - Exit-intent popup visibility and dismissal state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod popup;
pub mod profile;
pub mod resource;
pub mod types;

pub use filter::{ResourceFilter, Selection, UserFilter};
pub use popup::{
    PopupConfig, PopupController, PopupEffect, PopupEvent, PopupMetric, PopupOutcome, PopupState,
};
pub use profile::{Activity, ActivityStats, Profile, summarize_activity};
pub use resource::Resource;
pub use types::*;
