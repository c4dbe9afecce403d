//! Read-only aggregations over a date-bounded entry subset. Nothing here
//! mutates state; every operation accepts an optional inclusive
//! `[start_date, end_date]` bound, absent meaning unbounded on that side.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppResult;
use crate::models::mood::MoodPolarity;
use crate::models::tag::Tag;
use crate::services::labels;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TopTagsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MoodDistribution {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, Serialize)]
pub struct MostFrequentMood {
    pub mood: String,
    pub count: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AverageWordCount {
    pub average: f64,
    pub entries: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub word_count: i32,
}

/// Entry count per polarity bucket of the primary mood; buckets with zero
/// entries are still present.
pub async fn mood_distribution(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<MoodDistribution>> {
    let polarities = sqlx::query_scalar::<_, MoodPolarity>(
        r#"
        SELECT m.polarity FROM entries e
        JOIN moods m ON m.id = e.primary_mood_id
        WHERE ($1::date IS NULL OR e.entry_date >= $1)
          AND ($2::date IS NULL OR e.entry_date <= $2)
        "#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tally_polarities(&polarities)))
}

/// Mode of primary-mood names in range; ties break to the lexicographically
/// smallest name. `{"mood": "None", "count": 0}` for an empty range.
pub async fn most_frequent_mood(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<MostFrequentMood>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT m.name FROM entries e
        JOIN moods m ON m.id = e.primary_mood_id
        WHERE ($1::date IS NULL OR e.entry_date >= $1)
          AND ($2::date IS NULL OR e.entry_date <= $2)
        "#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    let (mood, count) = most_frequent(&names).unwrap_or_else(|| ("None".into(), 0));
    Ok(Json(MostFrequentMood { mood, count }))
}

/// Label frequency over the range: decode every entry's label set, tally,
/// sort by count descending (name ascending on ties), truncate to N. Ids no
/// longer present in the catalog are silently skipped.
pub async fn top_tags(
    State(state): State<AppState>,
    Query(query): Query<TopTagsQuery>,
) -> AppResult<Json<Vec<TagCount>>> {
    let encoded = sqlx::query_scalar::<_, String>(
        r#"
        SELECT tag_ids FROM entries
        WHERE tag_ids <> ''
          AND ($1::date IS NULL OR entry_date >= $1)
          AND ($2::date IS NULL OR entry_date <= $2)
        "#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    let counts = tally_labels(&encoded)?;
    if counts.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let ids: Vec<i64> = counts.keys().copied().collect();
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&state.db)
        .await?;
    let names: HashMap<i64, String> = tags.into_iter().map(|t| (t.id, t.name)).collect();

    Ok(Json(rank_tags(&counts, &names, query.top_n.unwrap_or(10))))
}

pub async fn average_word_count(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<AverageWordCount>> {
    let (entries, total): (i64, Option<i64>) = sqlx::query_as(
        r#"
        SELECT COUNT(*), SUM(word_count) FROM entries
        WHERE ($1::date IS NULL OR entry_date >= $1)
          AND ($2::date IS NULL OR entry_date <= $2)
        "#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(AverageWordCount {
        average: mean_word_count(entries, total),
        entries,
    }))
}

/// One `(date, word_count)` point per entry, ascending by date. No gap
/// filling for missed days.
pub async fn word_count_trend(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<TrendPoint>>> {
    let points = sqlx::query_as::<_, TrendPoint>(
        r#"
        SELECT entry_date AS date, word_count FROM entries
        WHERE ($1::date IS NULL OR entry_date >= $1)
          AND ($2::date IS NULL OR entry_date <= $2)
        ORDER BY entry_date
        "#,
    )
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(points))
}

/// Arithmetic mean of the stored word counts. An empty range averages to
/// exactly 0, never a division error.
fn mean_word_count(entries: i64, total: Option<i64>) -> f64 {
    if entries == 0 {
        0.0
    } else {
        total.unwrap_or(0) as f64 / entries as f64
    }
}

fn tally_polarities(polarities: &[MoodPolarity]) -> MoodDistribution {
    let mut dist = MoodDistribution {
        positive: 0,
        neutral: 0,
        negative: 0,
    };
    for p in polarities {
        match p {
            MoodPolarity::Positive => dist.positive += 1,
            MoodPolarity::Neutral => dist.neutral += 1,
            MoodPolarity::Negative => dist.negative += 1,
        }
    }
    dist
}

fn most_frequent(names: &[String]) -> Option<(String, i64)> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, count)| (name.to_string(), count))
}

fn tally_labels(encoded: &[String]) -> AppResult<HashMap<i64, i64>> {
    let mut counts = HashMap::new();
    for set in encoded {
        for id in labels::decode(set)? {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn rank_tags(
    counts: &HashMap<i64, i64>,
    names: &HashMap<i64, String>,
    top_n: usize,
) -> Vec<TagCount> {
    let mut ranked: Vec<TagCount> = counts
        .iter()
        .filter_map(|(id, &count)| {
            names.get(id).map(|name| TagCount {
                name: name.clone(),
                count,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn average_over_empty_range_is_exactly_zero() {
        assert_eq!(mean_word_count(0, None), 0.0);
        assert_eq!(mean_word_count(0, Some(0)), 0.0);
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        assert_eq!(mean_word_count(4, Some(10)), 2.5);
        assert_eq!(mean_word_count(1, Some(7)), 7.0);
    }

    #[test]
    fn distribution_keeps_empty_buckets() {
        let dist = tally_polarities(&[MoodPolarity::Positive, MoodPolarity::Positive]);
        assert_eq!(
            dist,
            MoodDistribution {
                positive: 2,
                neutral: 0,
                negative: 0
            }
        );
    }

    #[test]
    fn most_frequent_picks_mode() {
        let names = strs(&["Happy", "Sad", "Happy"]);
        assert_eq!(most_frequent(&names), Some(("Happy".into(), 2)));
    }

    #[test]
    fn most_frequent_tie_breaks_lexicographically() {
        let names = strs(&["Sad", "Happy", "Happy", "Sad"]);
        assert_eq!(most_frequent(&names), Some(("Happy".into(), 2)));
    }

    #[test]
    fn most_frequent_of_nothing_is_none() {
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn label_tally_counts_discrete_ids() {
        let counts = tally_labels(&strs(&["1,12", "12", "2"])).unwrap();
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(counts.get(&12), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));
    }

    #[test]
    fn label_tally_over_zero_entries_is_empty() {
        assert!(tally_labels(&[]).unwrap().is_empty());
    }

    #[test]
    fn ranking_skips_ids_missing_from_catalog_and_truncates() {
        let counts: HashMap<i64, i64> = [(1, 5), (2, 5), (99, 9), (3, 1)].into_iter().collect();
        let names: HashMap<i64, String> = [
            (1, "Work".to_string()),
            (2, "Family".to_string()),
            (3, "Travel".to_string()),
        ]
        .into_iter()
        .collect();

        let ranked = rank_tags(&counts, &names, 2);
        // id 99 has no catalog entry and is dropped; ties order by name.
        assert_eq!(
            ranked,
            vec![
                TagCount {
                    name: "Family".into(),
                    count: 5
                },
                TagCount {
                    name: "Work".into(),
                    count: 5
                },
            ]
        );
    }
}
