//! Reusable view components for the admin pages.

pub mod badge;
pub mod data_table;

pub use data_table::{FilterOption, FilterType, TableFilter};
