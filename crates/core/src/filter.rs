//! Derived filtered views over fetched collections.
//!
//! The admin list pages fetch a whole collection and narrow it in memory.
//! Filters never mutate the source: [`ResourceFilter::apply`] and
//! [`UserFilter::apply`] borrow the fetched slice and return the matching
//! rows in their original order, so the view can be recomputed from scratch
//! whenever the collection or a predicate changes.

use serde::Deserialize;

use crate::{Profile, Resource};

/// Select value meaning "no filter".
pub const ALL: &str = "all";

/// A categorical select filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Build a selection from a raw select value.
    ///
    /// Missing, blank and `"all"` values mean no filter.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(ALL) => Self::All,
            Some(value) => Self::Only(value.to_string()),
        }
    }

    /// Whether the selection narrows the list.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Only(_))
    }

    /// Select value to echo back into the form.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::Only(value) => value,
        }
    }

    /// Exact-match test. An absent value never matches an active selection.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

/// Case-insensitive substring test.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn optional_contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| contains_ignore_case(value, needle))
}

/// Raw query string of the resource list page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Search and select filters of the resource list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceFilter {
    pub search: String,
    pub resource_type: Selection,
    pub category: Selection,
}

impl From<&ResourceQuery> for ResourceFilter {
    fn from(query: &ResourceQuery) -> Self {
        Self {
            search: query.q.as_deref().unwrap_or("").trim().to_string(),
            resource_type: Selection::from_param(query.resource_type.as_deref()),
            category: Selection::from_param(query.category.as_deref()),
        }
    }
}

impl ResourceFilter {
    /// Whether any predicate narrows the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.resource_type.is_active() || self.category.is_active()
    }

    /// Test one resource against every predicate.
    ///
    /// The search term matches the title or the description.
    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        let search_hit = self.search.is_empty()
            || contains_ignore_case(&resource.title, &self.search)
            || optional_contains(resource.description.as_deref(), &self.search);

        search_hit
            && self.resource_type.matches(Some(&resource.resource_type))
            && self.category.matches(resource.category.as_deref())
    }

    /// Matching resources in source order.
    #[must_use]
    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        resources.iter().filter(|r| self.matches(r)).collect()
    }

    /// Message shown when the filtered list is empty.
    #[must_use]
    pub fn empty_message(&self) -> &'static str {
        if self.is_active() {
            "No resources found matching your filters."
        } else {
            "No resources available yet."
        }
    }
}

/// Free-text search of the user list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    pub search: String,
}

impl UserFilter {
    #[must_use]
    pub fn new(search: Option<&str>) -> Self {
        Self {
            search: search.unwrap_or("").trim().to_string(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
    }

    /// Matches name, primary interest or trading experience.
    ///
    /// An empty search keeps every profile, including ones with none of
    /// those fields set. The old dashboard dropped such profiles even when
    /// the search box was empty.
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        !self.is_active()
            || optional_contains(profile.full_name.as_deref(), &self.search)
            || optional_contains(profile.primary_interest.as_deref(), &self.search)
            || optional_contains(profile.trading_experience.as_deref(), &self.search)
    }

    #[must_use]
    pub fn apply<'a>(&self, profiles: &'a [Profile]) -> Vec<&'a Profile> {
        profiles.iter().filter(|p| self.matches(p)).collect()
    }

    #[must_use]
    pub fn empty_message(&self) -> &'static str {
        if self.is_active() {
            "No users found matching your search."
        } else {
            "No users registered yet."
        }
    }
}
