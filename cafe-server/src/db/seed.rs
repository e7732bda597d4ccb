//! Startup seeding
//!
//! Creates the bootstrap admin account when the admin table is empty,
//! using ADMIN_EMAIL / ADMIN_PASSWORD from the environment.

use sqlx::SqlitePool;

use crate::auth::password::hash_password;
use crate::db::repository::admin;
use shared::{AppError, AppResult};

const DEFAULT_ADMIN_EMAIL: &str = "admin@cafe.local";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Ensure at least one admin account exists.
///
/// No-op when any admin is already present.
pub async fn ensure_default_admin(pool: &SqlitePool) -> AppResult<()> {
    if admin::count(pool).await? > 0 {
        return Ok(());
    }

    let email = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string())
        .trim()
        .to_lowercase();
    let username =
        std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string());
    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) if !p.is_empty() => p,
        _ => {
            tracing::warn!(
                "ADMIN_PASSWORD not set, seeding default admin with password 'admin123', change it"
            );
            "admin123".to_string()
        }
    };

    let password_hash = hash_password(&password)?;
    admin::create(pool, &email, &username, &password_hash)
        .await
        .map_err(AppError::from)?;

    tracing::info!(email = %email, "Seeded bootstrap admin account");
    Ok(())
}
