//! Authentication Handlers
//!
//! Handles admin login, profile management and password changes.

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::admin;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{AdminInfo, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login - 管理员登录
///
/// Uniform error message and fixed delay regardless of whether the email
/// exists, to prevent enumeration and timing attacks.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let email = req.email.trim().to_lowercase();
    let account = admin::find_by_email(&state.pool, &email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match account {
        Some(a) => {
            if !password::verify_password(&req.password, &a.password_hash)? {
                tracing::warn!(email = %email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            a
        }
        None => {
            tracing::warn!(email = %email, "Login failed - account not found");
            return Err(AppError::invalid_credentials());
        }
    };

    admin::touch_last_login(&state.pool, account.id).await?;

    let token = state
        .jwt_service()
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(admin_id = account.id, email = %account.email, "Admin logged in");

    Ok(Json(LoginResponse {
        user: AdminInfo::from(&account),
        token,
    }))
}

/// GET /api/auth/profile - 当前管理员信息
pub async fn profile(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AdminInfo>> {
    let account = admin::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Admin {}", user.id)))?;
    Ok(Json(AdminInfo::from(&account)))
}

/// PUT /api/auth/profile - 更新管理员信息
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<AdminInfo>> {
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.username, "username", MAX_NAME_LEN)?;

    let email = payload.email.as_ref().map(|e| e.trim().to_lowercase());
    let account = admin::update_profile(
        &state.pool,
        user.id,
        email.as_deref(),
        payload.username.as_deref(),
    )
    .await?;

    tracing::info!(admin_id = user.id, "Admin profile updated");
    Ok(Json(AdminInfo::from(&account)))
}

/// POST /api/auth/change-password - 修改密码
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<bool>> {
    validate_required_text(&payload.current_password, "currentPassword", MAX_PASSWORD_LEN)?;
    validate_required_text(&payload.new_password, "newPassword", MAX_PASSWORD_LEN)?;
    if payload.new_password.len() < 8 {
        return Err(AppError::validation(
            "newPassword must be at least 8 characters",
        ));
    }

    let account = admin::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Admin {}", user.id)))?;

    if !password::verify_password(&payload.current_password, &account.password_hash)? {
        tracing::warn!(admin_id = user.id, "Password change failed - wrong current password");
        return Err(AppError::invalid_credentials());
    }

    let new_hash = password::hash_password(&payload.new_password)?;
    admin::update_password(&state.pool, user.id, &new_hash).await?;

    tracing::info!(admin_id = user.id, "Admin password changed");
    Ok(Json(true))
}
