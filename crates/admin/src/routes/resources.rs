//! Resource management list.
//!
//! Each page load fetches the whole `resources` collection once and narrows
//! it with the filters from the query string. Deleting posts back to the
//! server, which forwards one delete call and redirects to the list with the
//! same filters; the list is refetched by that redirect.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use tracing::instrument;
use tradepath_core::filter::ResourceQuery;
use tradepath_core::{Resource, ResourceFilter, ResourceId};

use crate::components::TableFilter;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

const TYPE_OPTIONS: &[(&str, &str)] = &[
    ("course", "Course"),
    ("guide", "Guide"),
    ("tool", "Tool"),
    ("video", "Video"),
    ("script", "Script"),
];

const CATEGORY_OPTIONS: &[(&str, &str)] = &[
    ("beginner", "Beginner"),
    ("intermediate", "Intermediate"),
    ("advanced", "Advanced"),
    ("tools", "Tools"),
];

/// Resource view for templates.
#[derive(Debug, Clone)]
pub struct ResourceView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: String,
    pub category: Option<String>,
    pub is_premium: bool,
    pub downloads: i64,
    pub created_at: String,
}

impl From<&Resource> for ResourceView {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            title: resource.title.clone(),
            description: resource.description.clone().filter(|d| !d.trim().is_empty()),
            resource_type: resource.resource_type.clone(),
            category: resource.category.clone(),
            is_premium: resource.is_premium,
            downloads: resource.downloads(),
            created_at: resource.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Resources list page template.
#[derive(Template)]
#[template(path = "resources/index.html")]
pub struct ResourcesIndexTemplate {
    pub current_path: &'static str,
    pub filter_bar: Vec<TableFilter>,
    pub resources: Vec<ResourceView>,
    pub total: usize,
    pub empty_message: &'static str,
    pub load_error: bool,
    /// Filters carried through the delete form.
    pub search: String,
    pub resource_type: String,
    pub category: String,
}

fn filter_bar(filter: &ResourceFilter) -> Vec<TableFilter> {
    vec![
        TableFilter::text("q", "Search", "Search resources...", &filter.search),
        TableFilter::select(
            "type",
            "Type",
            "All Types",
            TYPE_OPTIONS,
            filter.resource_type.as_param(),
        ),
        TableFilter::select(
            "category",
            "Category",
            "All Categories",
            CATEGORY_OPTIONS,
            filter.category.as_param(),
        ),
    ]
}

/// List URL that keeps the active filters.
#[must_use]
pub fn list_url(filter: &ResourceFilter) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if !filter.search.is_empty() {
        query.append_pair("q", &filter.search);
    }
    if filter.resource_type.is_active() {
        query.append_pair("type", filter.resource_type.as_param());
    }
    if filter.category.is_active() {
        query.append_pair("category", filter.category.as_param());
    }

    let query = query.finish();
    if query.is_empty() {
        "/resources".to_string()
    } else {
        format!("/resources?{query}")
    }
}

/// Resources list page handler.
///
/// # Errors
///
/// Returns an error only if the template fails to render.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Html<String>> {
    let filter = ResourceFilter::from(&query);

    let (all, load_error) = match state.data().fetch_resources().await {
        Ok(resources) => (resources, false),
        Err(e) => {
            tracing::error!("Failed to fetch resources: {e}");
            (vec![], true)
        }
    };

    let resources: Vec<ResourceView> = filter
        .apply(&all)
        .into_iter()
        .map(ResourceView::from)
        .collect();

    let template = ResourcesIndexTemplate {
        current_path: "/resources",
        filter_bar: filter_bar(&filter),
        total: all.len(),
        empty_message: filter.empty_message(),
        load_error,
        resources,
        search: filter.search.clone(),
        resource_type: filter.resource_type.as_param().to_string(),
        category: filter.category.as_param().to_string(),
    };

    Ok(Html(template.render()?))
}

/// Delete a resource and return to the filtered list.
///
/// The browser asks for confirmation before posting. A failed delete is
/// logged and the list is shown unchanged.
#[instrument(skip(state, form), fields(resource_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    Form(form): Form<ResourceQuery>,
) -> Redirect {
    match state.data().delete_resource(id).await {
        Ok(()) => tracing::info!("Resource deleted"),
        Err(e) => tracing::error!("Failed to delete resource: {e}"),
    }

    Redirect::to(&list_url(&ResourceFilter::from(&form)))
}
