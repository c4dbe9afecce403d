use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::services::streak;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_entry_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Returns the streak record, lazily creating it on first read. The current
/// streak is reported as 0 once more than a day has passed since the last
/// entry; the stored record is not rewritten by reads.
pub async fn get_streak(State(state): State<AppState>) -> AppResult<Json<StreakResponse>> {
    let mut conn = state.db.acquire().await?;
    let record = streak::read_or_init(&mut *conn).await?;

    let today = Utc::now().date_naive();
    Ok(Json(StreakResponse {
        current_streak: streak::effective_current(
            record.current_streak,
            record.last_entry_date,
            today,
        ),
        longest_streak: record.longest_streak,
        last_entry_date: record.last_entry_date,
        updated_at: record.updated_at,
    }))
}
