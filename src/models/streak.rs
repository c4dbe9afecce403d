use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single running streak record. `current_streak` is maintained
/// incrementally on entry creation and recomputed from full history after
/// deletions; `longest_streak` tracks the running maximum.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Streak {
    pub id: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_entry_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}
