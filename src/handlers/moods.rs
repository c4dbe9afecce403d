use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::mood::Mood;
use crate::AppState;

pub async fn list_moods(State(state): State<AppState>) -> AppResult<Json<Vec<Mood>>> {
    let moods = sqlx::query_as::<_, Mood>("SELECT * FROM moods ORDER BY polarity, name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(moods))
}
