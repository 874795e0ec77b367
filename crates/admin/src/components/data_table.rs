//! Filter bar types for the admin list tables.
//!
//! A filter bar is a list of [`TableFilter`]s rendered as one GET form, so
//! every filter round-trips through the query string.

use tradepath_core::filter::ALL;

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
}

/// Filter definition for a data table.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    pub filter_type: FilterType,
    /// Placeholder text (for text inputs).
    pub placeholder: Option<String>,
    /// Available options (for selects).
    pub options: Vec<FilterOption>,
    /// Current value echoed back into the form.
    pub value: String,
}

/// Option for select filters.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

impl TableFilter {
    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: Some(placeholder.to_string()),
            options: vec![],
            value: value.to_string(),
        }
    }

    /// Create a select filter whose first option is "all".
    #[must_use]
    pub fn select(key: &str, label: &str, all_label: &str, options: &[(&str, &str)], value: &str) -> Self {
        let options = std::iter::once(FilterOption::new(ALL, all_label))
            .chain(options.iter().map(|(value, label)| FilterOption::new(value, label)))
            .collect();

        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: None,
            options,
            value: value.to_string(),
        }
    }

    /// Whether this is a text input.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.filter_type == FilterType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_starts_with_all() {
        let filter = TableFilter::select(
            "type",
            "Type",
            "All Types",
            &[("course", "Course"), ("guide", "Guide")],
            "guide",
        );

        let values: Vec<&str> = filter.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec![ALL, "course", "guide"]);
        assert!(!filter.is_text());
        assert_eq!(filter.value, "guide");
    }

    #[test]
    fn test_text_filter() {
        let filter = TableFilter::text("q", "Search", "Search resources...", "order book");
        assert!(filter.is_text());
        assert_eq!(filter.placeholder.as_deref(), Some("Search resources..."));
        assert_eq!(filter.value, "order book");
    }
}
