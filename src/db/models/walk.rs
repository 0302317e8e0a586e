use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded walk. A walk with no `ended_at` is the in-progress walk; the
/// final step and distance readings are written together with `ended_at` when
/// the recording is committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Walk {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub pause_secs: u64,
    pub steps: Option<u64>,
    pub distance_meters: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Walk {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}
