//! External services used by the admin panel.

pub mod data_service;

pub use data_service::{DataServiceError, RestDataService};
