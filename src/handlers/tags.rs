use axum::{extract::State, Json};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::tag::{CreateTagRequest, Tag};
use crate::services::labels;
use crate::AppState;

pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<Vec<Tag>>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(tags))
}

/// Get-or-create by exact name: creating a duplicate name returns the
/// existing tag rather than a second row.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<CreateTagRequest>,
) -> AppResult<Json<Tag>> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Tag name is required".into()));
    }

    if let Some(existing) = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = $1")
        .bind(&body.name)
        .fetch_optional(&state.db)
        .await?
    {
        return Ok(Json(existing));
    }

    let tag = sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (name, is_custom)
        VALUES ($1, true)
        RETURNING *
        "#,
    )
    .bind(&body.name)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(tag_id = tag.id, name = %tag.name, "Custom tag created");
    Ok(Json(tag))
}

/// Resolve an encoded label set to full tag objects. Ids with no catalog
/// match are silently dropped; a corrupt field fails with
/// `MalformedLabelSet`.
pub async fn resolve_tags(db: &PgPool, encoded: &str) -> AppResult<Vec<Tag>> {
    let ids = labels::decode(encoded)?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ANY($1) ORDER BY name")
        .bind(&ids)
        .fetch_all(db)
        .await?;
    Ok(tags)
}
