use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed reference data seeded by migration; entries cannot delete a mood
/// that is referenced (ON DELETE RESTRICT).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: i64,
    pub name: String,
    pub polarity: MoodPolarity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_polarity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MoodPolarity {
    Positive,
    Neutral,
    Negative,
}
