//! Menu Model

use serde::{Deserialize, Serialize};

/// Menu section. Each restaurant groups its foods under these fixed names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT", rename_all = "snake_case"))]
pub enum MenuSection {
    Appetizer,
    MainCourse,
    Dessert,
    Beverage,
}

/// Menu entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Menu {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: MenuSection,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub restaurant_id: i64,
    pub name: MenuSection,
    pub description: Option<String>,
}

/// Update menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub name: Option<MenuSection>,
    pub description: Option<String>,
    pub active: Option<bool>,
}
