//! User account database operations

use shared::error::AppError;
use shared::models::{User, UserRole};
use sqlx::PgPool;

use crate::error::{ServiceResult, is_unique_violation};

const USER_COLUMNS: &str = "id, username, email, phone, role, avatar_url, created_at, updated_at";

/// User row including the password hash (never leaves the server)
#[derive(sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User {
            id: r.id,
            username: r.username,
            email: r.email,
            phone: r.phone,
            role: r.role,
            avatar_url: r.avatar_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub avatar_url: Option<&'a str>,
}

#[derive(Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
}

fn duplicate(e: sqlx::Error) -> crate::error::ServiceError {
    if is_unique_violation(&e) {
        AppError::new(shared::error::ErrorCode::UserAlreadyExists).into()
    } else {
        e.into()
    }
}

pub async fn create(pool: &PgPool, user: &NewUser<'_>, now: i64) -> ServiceResult<User> {
    let sql = format!(
        r#"
        INSERT INTO users (username, email, phone, password_hash, role, avatar_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as(&sql)
        .bind(user.username)
        .bind(user.email)
        .bind(user.phone)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(user.avatar_url)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(duplicate)
}

pub async fn find(pool: &PgPool, id: i64) -> ServiceResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(user)
}

pub async fn find_record(pool: &PgPool, id: i64) -> ServiceResult<Option<UserRecord>> {
    let record = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// Look up by username, email (case-insensitive) or phone
pub async fn find_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> ServiceResult<Option<UserRecord>> {
    let record = sqlx::query_as(
        r#"
        SELECT * FROM users
        WHERE username = $1 OR lower(email) = lower($1) OR phone = $1
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
    let users = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &UserChanges,
    now: i64,
) -> ServiceResult<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users SET
            username = COALESCE($1, username),
            email = COALESCE($2, email),
            phone = COALESCE($3, phone),
            role = COALESCE($4, role),
            avatar_url = COALESCE($5, avatar_url),
            password_hash = COALESCE($6, password_hash),
            updated_at = $7
        WHERE id = $8
        RETURNING {USER_COLUMNS}
        "#
    );
    sqlx::query_as(&sql)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(changes.role)
        .bind(&changes.avatar_url)
        .bind(&changes.password_hash)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(duplicate)
}

pub async fn delete(pool: &PgPool, id: i64) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
