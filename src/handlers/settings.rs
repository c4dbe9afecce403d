use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::profile::{Profile, UpdateThemeRequest};
use crate::AppState;

pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Profile>> {
    // Lazily create the single profile row; the no-op update makes
    // ON CONFLICT return the existing row.
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profile (id) VALUES (1)
        ON CONFLICT (id) DO UPDATE SET id = profile.id
        RETURNING *
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}

pub async fn update_theme(
    State(state): State<AppState>,
    Json(body): Json<UpdateThemeRequest>,
) -> AppResult<Json<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profile (id, theme) VALUES (1, $1)
        ON CONFLICT (id) DO UPDATE SET theme = $1, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(body.theme)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}
