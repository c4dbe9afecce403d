use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::tag::Tag;

/// One journal record, uniquely keyed by calendar date. `tag_ids` is the
/// encoded label set (comma-joined decimal tag ids, '' = no labels); the API
/// surface exchanges label sets as integer arrays instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i64,
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub primary_mood_id: i64,
    pub secondary_mood1_id: Option<i64>,
    pub secondary_mood2_id: Option<i64>,
    pub category_id: Option<i64>,
    #[serde(skip_serializing)]
    pub tag_ids: String,
    pub word_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub primary_mood_id: i64,
    pub secondary_mood1_id: Option<i64>,
    pub secondary_mood2_id: Option<i64>,
    pub category_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Full replacement of the content-bearing fields; the entry date is
/// immutable once created and deliberately absent here.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub content: String,
    pub primary_mood_id: i64,
    pub secondary_mood1_id: Option<i64>,
    pub secondary_mood2_id: Option<i64>,
    pub category_id: Option<i64>,
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EntryPage {
    pub entries: Vec<EntryWithLabels>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Entry with its label set already resolved to full tag objects, so
/// downstream consumers (export, rendering) never re-resolve ids.
#[derive(Debug, Serialize)]
pub struct EntryWithTags {
    #[serde(flatten)]
    pub entry: Entry,
    pub tags: Vec<Tag>,
}

/// Entry with the label set decoded to discrete ids (list views).
#[derive(Debug, Serialize)]
pub struct EntryWithLabels {
    #[serde(flatten)]
    pub entry: Entry,
    pub tag_ids: Vec<i64>,
}
