//! Badge colour lookup tables.
//!
//! Type and category tags are free-form strings owned by the data service,
//! so unknown values fall back to gray instead of failing.

/// Tailwind-style colour used when a tag has no entry.
pub const DEFAULT_COLOR: &str = "gray";

const TYPE_COLORS: &[(&str, &str)] = &[
    ("course", "blue"),
    ("guide", "green"),
    ("tool", "purple"),
    ("video", "red"),
    ("script", "yellow"),
];

const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("beginner", "green"),
    ("intermediate", "yellow"),
    ("advanced", "red"),
    ("tools", "purple"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> &'static str {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DEFAULT_COLOR, |(_, color)| color)
}

/// Colour of a resource type badge.
#[must_use]
pub fn type_color(resource_type: &str) -> &'static str {
    lookup(TYPE_COLORS, resource_type)
}

/// Colour of a resource category badge.
#[must_use]
pub fn category_color(category: &str) -> &'static str {
    lookup(CATEGORY_COLORS, category)
}

/// Badge variant of a user role.
#[must_use]
pub fn role_variant(role: &str) -> &'static str {
    if role == "admin" { "destructive" } else { "secondary" }
}
