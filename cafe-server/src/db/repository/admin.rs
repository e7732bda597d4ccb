//! Admin Account Repository

use super::{RepoError, RepoResult};
use shared::models::Admin;
use sqlx::SqlitePool;

const ADMIN_SELECT: &str = "SELECT id, email, username, password_hash, role, last_login, created_at, updated_at FROM admin";

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Admin>> {
    let sql = format!("{} WHERE email = ?", ADMIN_SELECT);
    let row = sqlx::query_as::<_, Admin>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Admin>> {
    let sql = format!("{} WHERE id = ?", ADMIN_SELECT);
    let row = sqlx::query_as::<_, Admin>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO admin (id, email, username, password_hash, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'admin', ?5, ?5)",
    )
    .bind(id)
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin".into()))
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE admin SET last_login = ?1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    email: Option<&str>,
    username: Option<&str>,
) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE admin SET email = COALESCE(?1, email), username = COALESCE(?2, username), updated_at = ?3 WHERE id = ?4",
    )
    .bind(email)
    .bind(username)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Admin {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Admin {id} not found")))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE admin SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Admin {id} not found")));
    }
    Ok(())
}
