//! Body-weight progress entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weigh-in on a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: i64,
    pub date: NaiveDate,
    pub weight: f64,
}

impl Progress {
    pub const ENTITY: &'static str = "progress";
}

/// Fields supplied when recording progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInput {
    pub date: NaiveDate,
    pub weight: f64,
}

impl ProgressInput {
    pub const fn into_progress(self, id: i64) -> Progress {
        Progress {
            id,
            date: self.date,
            weight: self.weight,
        }
    }
}
