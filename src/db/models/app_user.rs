use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub zip: String,
    pub age: u32,
    /// Server-side account identifier, absent until the first sync succeeds.
    pub account_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
