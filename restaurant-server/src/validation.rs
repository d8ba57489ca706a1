//! Input validation helpers
//!
//! Length limits and per-payload checks used by the CRUD handlers.
//! Lengths are counted in characters, not bytes.

use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{
    DiningTableCreate, DiningTableUpdate, FoodCreate, FoodUpdate, MenuCreate, MenuUpdate,
    NoteCreate, NoteUpdate, RestaurantCreate, RestaurantUpdate, UserSignup, UserUpdate,
};

use crate::orders::pricing::MAX_PRICE;
use crate::password_reset::service::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};

// ── Text length limits ──────────────────────────────────────────────

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

pub const MIN_PHONE_LEN: usize = 10;
pub const MAX_PHONE_LEN: usize = 15;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

pub const MIN_RESTAURANT_NAME_LEN: usize = 3;
pub const MIN_FOOD_NAME_LEN: usize = 2;

/// Entity names: restaurant, table, food
pub const MAX_NAME_LEN: usize = 100;

pub const MIN_NOTE_TITLE_LEN: usize = 3;
pub const MIN_NOTE_CONTENT_LEN: usize = 10;

/// Descriptions and note bodies
pub const MAX_TEXT_LEN: usize = 500;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

pub const MAX_SPICY_LEVEL: i32 = 5;

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    validate_text_range(value, field, 1, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        let len = v.chars().count();
        if len > max_len {
            return Err(AppError::validation(format!(
                "{field} is too long ({len} chars, max {max_len})"
            )));
        }
    }
    Ok(())
}

/// Validate a trimmed-non-empty string whose length is within `min..=max`.
pub fn validate_text_range(
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    let len = value.chars().count();
    if len < min_len {
        return Err(AppError::validation(format!(
            "{field} is too short ({len} chars, min {min_len})"
        )));
    }
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

fn validate_optional_range(
    value: &Option<String>,
    field: &str,
    min_len: usize,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_text_range(v, field, min_len, max_len),
        None => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(AppError::validation("email is not a valid address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::new(shared::error::ErrorCode::PasswordTooShort).with_detail(
            "reason",
            format!("password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_non_negative(value: Option<i32>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value
        && v < 0
    {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    Ok(())
}

/// Prices are stored as NUMERIC(10, 2): at most 2 decimals, capped at [`MAX_PRICE`].
fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::validation("price must not be negative"));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({MAX_PRICE})"
        )));
    }
    if price.normalize().scale() > 2 {
        return Err(AppError::validation(
            "price must have at most 2 decimal places",
        ));
    }
    Ok(())
}

fn validate_spicy_level(level: Option<i32>) -> Result<(), AppError> {
    if let Some(v) = level
        && !(0..=MAX_SPICY_LEVEL).contains(&v)
    {
        return Err(AppError::validation(format!(
            "spicy_level must be between 0 and {MAX_SPICY_LEVEL}"
        )));
    }
    Ok(())
}

// ── Users ───────────────────────────────────────────────────────────

pub fn validate_signup(data: &UserSignup) -> Result<(), AppError> {
    validate_text_range(&data.username, "username", MIN_USERNAME_LEN, MAX_USERNAME_LEN)?;
    validate_email(&data.email)?;
    validate_text_range(&data.phone, "phone", MIN_PHONE_LEN, MAX_PHONE_LEN)?;
    validate_password(&data.password)?;
    validate_optional_text(&data.avatar_url, "avatar_url", MAX_URL_LEN)
}

pub fn validate_user_update(data: &UserUpdate) -> Result<(), AppError> {
    validate_optional_range(&data.username, "username", MIN_USERNAME_LEN, MAX_USERNAME_LEN)?;
    if let Some(email) = &data.email {
        validate_email(email)?;
    }
    validate_optional_range(&data.phone, "phone", MIN_PHONE_LEN, MAX_PHONE_LEN)?;
    if let Some(password) = &data.password {
        validate_password(password)?;
    }
    validate_optional_text(&data.avatar_url, "avatar_url", MAX_URL_LEN)
}

// ── Catalog ─────────────────────────────────────────────────────────

pub fn validate_restaurant_create(data: &RestaurantCreate) -> Result<(), AppError> {
    validate_text_range(&data.name, "name", MIN_RESTAURANT_NAME_LEN, MAX_NAME_LEN)?;
    validate_required_text(&data.address, "address", MAX_TEXT_LEN)?;
    validate_optional_text(&data.logo, "logo", MAX_URL_LEN)?;
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)
}

pub fn validate_restaurant_update(data: &RestaurantUpdate) -> Result<(), AppError> {
    validate_optional_range(&data.name, "name", MIN_RESTAURANT_NAME_LEN, MAX_NAME_LEN)?;
    validate_optional_range(&data.address, "address", 1, MAX_TEXT_LEN)?;
    validate_optional_text(&data.logo, "logo", MAX_URL_LEN)?;
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    if let Some(c) = capacity
        && c < 1
    {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    Ok(())
}

pub fn validate_table_create(data: &DiningTableCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_capacity(Some(data.capacity))?;
    validate_optional_text(&data.location, "location", MAX_NAME_LEN)
}

pub fn validate_table_update(data: &DiningTableUpdate) -> Result<(), AppError> {
    validate_optional_range(&data.name, "name", 1, MAX_NAME_LEN)?;
    validate_capacity(data.capacity)?;
    validate_optional_text(&data.location, "location", MAX_NAME_LEN)
}

pub fn validate_menu_create(data: &MenuCreate) -> Result<(), AppError> {
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)
}

pub fn validate_menu_update(data: &MenuUpdate) -> Result<(), AppError> {
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)
}

pub fn validate_food_create(data: &FoodCreate) -> Result<(), AppError> {
    validate_text_range(&data.name, "name", MIN_FOOD_NAME_LEN, MAX_NAME_LEN)?;
    validate_price(data.price)?;
    validate_spicy_level(data.spicy_level)?;
    validate_non_negative(data.calories, "calories")?;
    validate_non_negative(data.prep_time, "prep_time")?;
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)?;
    validate_optional_text(&data.ingredients, "ingredients", MAX_TEXT_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)
}

pub fn validate_food_update(data: &FoodUpdate) -> Result<(), AppError> {
    validate_optional_range(&data.name, "name", MIN_FOOD_NAME_LEN, MAX_NAME_LEN)?;
    if let Some(price) = data.price {
        validate_price(price)?;
    }
    validate_spicy_level(data.spicy_level)?;
    validate_non_negative(data.calories, "calories")?;
    validate_non_negative(data.prep_time, "prep_time")?;
    validate_optional_text(&data.description, "description", MAX_TEXT_LEN)?;
    validate_optional_text(&data.ingredients, "ingredients", MAX_TEXT_LEN)?;
    validate_optional_text(&data.image_url, "image_url", MAX_URL_LEN)
}

pub fn validate_note_create(data: &NoteCreate) -> Result<(), AppError> {
    validate_text_range(&data.title, "title", MIN_NOTE_TITLE_LEN, MAX_NAME_LEN)?;
    validate_text_range(&data.content, "content", MIN_NOTE_CONTENT_LEN, MAX_TEXT_LEN)
}

pub fn validate_note_update(data: &NoteUpdate) -> Result<(), AppError> {
    validate_optional_range(&data.title, "title", MIN_NOTE_TITLE_LEN, MAX_NAME_LEN)?;
    validate_optional_range(&data.content, "content", MIN_NOTE_CONTENT_LEN, MAX_TEXT_LEN)
}
