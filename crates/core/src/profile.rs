//! User profiles and activity records from the remote data service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActivityId, ProfileId, UserId};

/// A row of the remote `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub primary_interest: Option<String>,
    #[serde(default)]
    pub trading_experience: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Name shown in listings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Anonymous User")
    }

    /// Role label shown in the role badge.
    #[must_use]
    pub const fn role(&self) -> &'static str {
        if self.is_admin { "admin" } else { "user" }
    }
}

/// A row of the remote `user_activities` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    #[serde(default)]
    pub activity_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user activity aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityStats {
    pub count: usize,
    pub last_active: Option<DateTime<Utc>>,
}

/// Count activities per user and find each user's most recent one.
#[must_use]
pub fn summarize_activity(activities: &[Activity]) -> HashMap<UserId, ActivityStats> {
    let mut stats: HashMap<UserId, ActivityStats> = HashMap::new();

    for activity in activities {
        let entry = stats.entry(activity.user_id).or_default();
        entry.count += 1;
        entry.last_active = entry.last_active.max(Some(activity.created_at));
    }

    stats
}
