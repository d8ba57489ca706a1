//! User accounts: signup, login, profile, deletion and password reset

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AuthResponse, ConfirmPassword, PasswordReset, PasswordResetRequest, User, UserLogin,
    UserRole, UserSignup, UserUpdate,
};

use crate::auth::UserIdentity;
use crate::auth::user_auth::create_token;
use crate::db::users::{self, NewUser, UserChanges, UserRecord};
use crate::password_reset::ResetError;
use crate::password_reset::service::normalize_email;
use crate::state::AppState;
use crate::util::{hash_password, now_millis, verify_password};
use crate::validation;

use super::{ApiResult, Json};

const RESET_SENT_MESSAGE: &str = "If the email exists, a reset code has been sent";

fn issue_token(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token = create_token(&user, &state.config.jwt_secret, state.config.jwt_expiry_hours)
        .map_err(|e| AppError::internal(format!("JWT creation failed: {e}")))?;
    Ok(AuthResponse { token, user })
}

fn hash(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Only the account owner or an admin may touch an account
fn ensure_self_or_admin(identity: &UserIdentity, user_id: i64) -> Result<(), AppError> {
    if identity.user_id == user_id || identity.role == UserRole::Admin {
        Ok(())
    } else {
        Err(AppError::permission_denied("Cannot modify another user's account"))
    }
}

async fn load_record(state: &AppState, user_id: i64) -> Result<UserRecord, AppError> {
    users::find_record(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id))
}

/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<UserSignup>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validation::validate_signup(&req)?;

    let email = normalize_email(&req.email);
    let password_hash = hash(&req.password)?;
    let user = users::create(
        &state.pool,
        &NewUser {
            username: req.username.trim(),
            email: &email,
            phone: req.phone.trim(),
            password_hash: &password_hash,
            role: req.role,
            avatar_url: req.avatar_url.as_deref(),
        },
        now_millis(),
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<UserLogin>,
) -> ApiResult<AuthResponse> {
    let record = users::find_by_identifier(&state.pool, req.identifier.trim())
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &record.password_hash) {
        tracing::warn!(user_id = record.id, "Login with wrong password");
        return Err(AppError::invalid_credentials());
    }

    let user = User::from(record);
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(issue_token(&state, user)?))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(Json(users::list(&state.pool).await?))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<User> {
    let user = users::find(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id))?;
    Ok(Json(user))
}

/// PATCH /users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> ApiResult<AuthResponse> {
    ensure_self_or_admin(&identity, user_id)?;
    validation::validate_user_update(&req)?;
    if req.role == Some(UserRole::Admin) && identity.role != UserRole::Admin {
        return Err(AppError::permission_denied("Only admins can grant the admin role"));
    }

    let record = load_record(&state, user_id).await?;
    if !verify_password(&req.old_password, &record.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    let password_hash = match &req.password {
        Some(p) => Some(hash(p)?),
        None => None,
    };
    let changes = UserChanges {
        username: req.username.map(|u| u.trim().to_string()),
        email: req.email.as_deref().map(normalize_email),
        phone: req.phone.map(|p| p.trim().to_string()),
        role: req.role,
        avatar_url: req.avatar_url,
        password_hash,
    };

    let user = users::update(&state.pool, user_id, &changes, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id))?;

    tracing::info!(user_id, actor = %identity.username, "User updated");
    Ok(Json(issue_token(&state, user)?))
}

/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(user_id): Path<i64>,
    Json(req): Json<ConfirmPassword>,
) -> Result<StatusCode, AppError> {
    ensure_self_or_admin(&identity, user_id)?;

    let record = load_record(&state, user_id).await?;
    if !verify_password(&req.password, &record.password_hash) {
        return Err(AppError::invalid_credentials());
    }
    if !users::delete(&state.pool, user_id).await? {
        return Err(AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id));
    }

    tracing::info!(user_id, actor = %identity.username, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/reset-password-otp
///
/// Unknown emails get the same answer as known ones.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<serde_json::Value> {
    match state.password_reset.request_reset(&req.email).await {
        Ok(()) | Err(ResetError::UserNotFound) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(Json(serde_json::json!({ "message": RESET_SENT_MESSAGE })))
}

/// POST /users/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<PasswordReset>,
) -> ApiResult<serde_json::Value> {
    state
        .password_reset
        .verify_and_reset(&req.email, &req.otp, &req.new_password)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Password has been reset" })))
}
