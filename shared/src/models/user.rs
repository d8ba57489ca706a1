//! User Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "TEXT"))]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

/// User entity (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Signup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignup {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

/// Login payload. `identifier` is a username, email or phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLogin {
    pub identifier: String,
    pub password: String,
}

/// Profile update payload. Requires the current password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub old_password: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub avatar_url: Option<String>,
    /// New password
    pub password: Option<String>,
}

/// Account deletion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPassword {
    pub password: String,
}

/// Request a reset code by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Reset the password with a previously mailed code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Signup / login / update response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
