//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use crate::components::badge;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Badge colour of a resource type.
///
/// Usage in templates: `{{ resource.resource_type|type_badge }}`
#[askama::filter_fn]
pub fn type_badge(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge::type_color(&value.to_string()))
}

/// Badge colour of a resource category.
#[askama::filter_fn]
pub fn category_badge(
    value: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(badge::category_color(&value.to_string()))
}

/// Badge variant of a user role (`admin` is highlighted).
#[askama::filter_fn]
pub fn role_badge(value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(badge::role_variant(&value.to_string()))
}
