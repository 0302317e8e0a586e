use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A time-boxed walking contest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl Contest {
    pub fn is_before_start(&self, today: NaiveDate) -> bool {
        today < self.starts_on
    }
}
