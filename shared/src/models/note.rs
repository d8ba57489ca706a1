//! Note Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "lowercase"))]
pub enum NotePriority {
    Low,
    Medium,
    High,
}

/// Staff note attached to a restaurant, optionally to one of its orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Note {
    pub id: i64,
    pub restaurant_id: i64,
    pub order_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub priority: NotePriority,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create note payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCreate {
    pub restaurant_id: i64,
    pub order_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub priority: NotePriority,
}

/// Update note payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<NotePriority>,
}
