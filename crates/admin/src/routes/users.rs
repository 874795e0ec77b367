//! User management list.
//!
//! Profiles and activity records are fetched together on each page load.
//! Activity counts and last activity are derived per user; a failed
//! activity fetch only blanks those columns.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use tradepath_core::{ActivityStats, Profile, UserFilter, summarize_activity};

use crate::components::TableFilter;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub q: Option<String>,
}

/// User view for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub role: &'static str,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub interest: Option<String>,
    pub activity_count: usize,
    pub last_active: String,
    pub joined: String,
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

impl UserView {
    fn new(profile: &Profile, stats: ActivityStats) -> Self {
        Self {
            name: profile.display_name().to_string(),
            role: profile.role(),
            phone: profile.phone_number.clone(),
            experience: profile.trading_experience.clone(),
            interest: profile.primary_interest.clone(),
            activity_count: stats.count,
            last_active: stats
                .last_active
                .map_or_else(|| "Never".to_string(), format_date),
            joined: format_date(profile.created_at),
        }
    }
}

/// Users list page template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub current_path: &'static str,
    pub filter_bar: Vec<TableFilter>,
    pub users: Vec<UserView>,
    pub total: usize,
    pub empty_message: &'static str,
    pub load_error: bool,
}

/// Users list page handler.
///
/// # Errors
///
/// Returns an error only if the template fails to render.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Html<String>> {
    let filter = UserFilter::new(query.q.as_deref());

    let (profiles, activities) = tokio::join!(
        state.data().fetch_users(),
        state.data().fetch_activities()
    );

    let (profiles, load_error) = match profiles {
        Ok(profiles) => (profiles, false),
        Err(e) => {
            tracing::error!("Failed to fetch users: {e}");
            (vec![], true)
        }
    };

    let activities = activities.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch user activities: {e}");
        vec![]
    });
    let stats = summarize_activity(&activities);

    let users = filter
        .apply(&profiles)
        .into_iter()
        .map(|profile| {
            UserView::new(
                profile,
                stats.get(&profile.user_id).copied().unwrap_or_default(),
            )
        })
        .collect();

    let template = UsersIndexTemplate {
        current_path: "/users",
        filter_bar: vec![TableFilter::text(
            "q",
            "Search",
            "Search users...",
            &filter.search,
        )],
        users,
        total: profiles.len(),
        empty_message: filter.empty_message(),
        load_error,
    };

    Ok(Html(template.render()?))
}
