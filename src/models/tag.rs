use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub is_custom: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}
