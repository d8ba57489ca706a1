//! Food Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Food entity (a priced menu entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub menu_id: i64,
    pub restaurant_id: i64,
    pub ingredients: Option<String>,
    /// Preparation time in minutes
    pub prep_time: Option<i32>,
    pub calories: Option<i32>,
    /// 0 (mild) to 5
    pub spicy_level: Option<i32>,
    pub vegetarian: bool,
    pub available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub menu_id: i64,
    pub restaurant_id: i64,
    pub ingredients: Option<String>,
    pub prep_time: Option<i32>,
    pub calories: Option<i32>,
    pub spicy_level: Option<i32>,
    pub vegetarian: Option<bool>,
    pub available: Option<bool>,
}

/// Update food payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub menu_id: Option<i64>,
    pub ingredients: Option<String>,
    pub prep_time: Option<i32>,
    pub calories: Option<i32>,
    pub spicy_level: Option<i32>,
    pub vegetarian: Option<bool>,
    pub available: Option<bool>,
}
