use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A PDD row. Linked video ids live in `pdd_videos` and are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pdd {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Path relative to the media root, e.g. `uploads/videos/<uuid>.mp4`
    pub videofile: Option<String>,
}

impl std::fmt::Display for Pdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
