use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::entry::{Entry, EntryWithLabels};
use crate::services::labels;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub mood_ids: Option<Vec<i64>>,
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct MissedDaysQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Case-sensitive substring search over title and content. A blank query is
/// equivalent to list-all.
pub async fn search_entries(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<EntryWithLabels>>> {
    let term = query.q.unwrap_or_default();

    let rows = if term.trim().is_empty() {
        sqlx::query_as::<_, Entry>("SELECT * FROM entries ORDER BY entry_date DESC")
            .fetch_all(&state.db)
            .await?
    } else {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT * FROM entries
            WHERE POSITION($1 IN title) > 0 OR POSITION($1 IN content) > 0
            ORDER BY entry_date DESC
            "#,
        )
        .bind(&term)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(labels::decode_entries(rows)?))
}

/// Conjunction of the predicates that are present: inclusive date range,
/// mood membership (primary or either secondary), and label membership.
/// Label membership is tested against the decoded id set, never against the
/// encoded string.
pub async fn filter_entries(
    State(state): State<AppState>,
    Json(body): Json<FilterRequest>,
) -> AppResult<Json<Vec<EntryWithLabels>>> {
    let mood_ids = body.mood_ids.unwrap_or_default();

    let rows = sqlx::query_as::<_, Entry>(
        r#"
        SELECT * FROM entries
        WHERE ($1::date IS NULL OR entry_date >= $1)
          AND ($2::date IS NULL OR entry_date <= $2)
          AND (cardinality($3::bigint[]) = 0
               OR primary_mood_id = ANY($3)
               OR secondary_mood1_id = ANY($3)
               OR secondary_mood2_id = ANY($3))
        ORDER BY entry_date DESC
        "#,
    )
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(&mood_ids)
    .fetch_all(&state.db)
    .await?;

    let mut entries = labels::decode_entries(rows)?;
    if let Some(tag_ids) = body.tag_ids.filter(|ids| !ids.is_empty()) {
        entries.retain(|e| e.tag_ids.iter().any(|id| tag_ids.contains(id)));
    }

    Ok(Json(entries))
}

pub async fn missed_days(
    State(state): State<AppState>,
    Query(query): Query<MissedDaysQuery>,
) -> AppResult<Json<Vec<NaiveDate>>> {
    if query.start_date > query.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let present: HashSet<NaiveDate> = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT entry_date FROM entries WHERE entry_date BETWEEN $1 AND $2",
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .collect();

    Ok(Json(missing_days(query.start_date, query.end_date, &present)))
}

/// Every calendar date in `[start, end]` (inclusive both ends) with no entry.
fn missing_days(start: NaiveDate, end: NaiveDate, present: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    let mut missed = Vec::new();
    let mut date = start;
    while date <= end {
        if !present.contains(&date) {
            missed.push(date);
        }
        date = date + Days::new(1);
    }
    missed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn enumerates_gaps_inclusive_of_both_ends() {
        let present: HashSet<NaiveDate> = [d("2024-01-02"), d("2024-01-04")].into_iter().collect();
        assert_eq!(
            missing_days(d("2024-01-01"), d("2024-01-05"), &present),
            vec![d("2024-01-01"), d("2024-01-03"), d("2024-01-05")]
        );
    }

    #[test]
    fn full_range_present_yields_nothing() {
        let present: HashSet<NaiveDate> = [d("2024-01-01")].into_iter().collect();
        assert!(missing_days(d("2024-01-01"), d("2024-01-01"), &present).is_empty());
    }

    #[test]
    fn single_day_range_with_no_entry() {
        let present = HashSet::new();
        assert_eq!(
            missing_days(d("2024-01-01"), d("2024-01-01"), &present),
            vec![d("2024-01-01")]
        );
    }
}
