//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::SqlitePool;

const MENU_ITEM_SELECT: &str = "SELECT id, name, category, price, image, description, is_active, created_at, updated_at FROM menu_item";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("{} ORDER BY created_at DESC", MENU_ITEM_SELECT);
    let rows = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Active items for the public menu, grouped the way the menu page shows them
pub async fn find_active_sorted(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "{} WHERE is_active = 1 ORDER BY category ASC, name ASC",
        MENU_ITEM_SELECT
    );
    let rows = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{} WHERE id = ?", MENU_ITEM_SELECT);
    let row = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let image = data.image.unwrap_or_else(|| "/placeholder.svg".to_string());
    sqlx::query(
        "INSERT INTO menu_item (id, name, category, price, image, description, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.category)
    .bind(data.price)
    .bind(&image)
    .bind(&data.description)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_item SET name = COALESCE(?1, name), category = COALESCE(?2, category), price = COALESCE(?3, price), image = COALESCE(?4, image), description = COALESCE(?5, description), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(&data.name)
    .bind(data.category)
    .bind(data.price)
    .bind(&data.image)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Availability toggle (PATCH); keeps the item in the catalog
pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE menu_item SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(is_active)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}
