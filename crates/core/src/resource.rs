//! Learning resources (courses, guides, tools, videos, scripts).
//!
//! Rows are owned by the remote data service; the admin panel only reads
//! them and asks the service to delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ResourceId;

/// A resource row as returned by the remote `resources` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form type tag (`course`, `guide`, `tool`, `video`, `script`, ...).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Difficulty/category tag. Older rows have none.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub download_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Download count with missing values shown as zero.
    #[must_use]
    pub fn downloads(&self) -> i64 {
        self.download_count.unwrap_or(0)
    }
}
