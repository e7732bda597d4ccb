//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::menu_item;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_positive_price,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};

/// GET /api/menu - 公共菜单 (仅在售商品，按分类和名称排序)
pub async fn public_menu(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_active_sorted(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/menu-items - 获取所有商品 (含下架)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_all(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/menu-items/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {}", id)))?;
    Ok(Json(item))
}

/// POST /api/menu-items - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_positive_price(payload.price, "price")?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let item = menu_item::create(&state.pool, payload).await?;

    tracing::info!(id = item.id, name = %item.name, "Menu item created");
    Ok(Json(item))
}

/// PUT /api/menu-items/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_positive_price(price, "price")?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let item = menu_item::update(&state.pool, id, payload).await?;

    tracing::info!(id = item.id, "Menu item updated");
    Ok(Json(item))
}

/// DELETE /api/menu-items/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let deleted = menu_item::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Menu item {}", id)));
    }

    tracing::info!(id = id, "Menu item deleted");
    Ok(Json(true))
}

/// Payload for availability toggle
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityUpdate {
    pub is_active: bool,
}

/// PATCH /api/menu-items/:id - 上架/下架商品
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityUpdate>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::set_active(&state.pool, id, payload.is_active).await?;

    tracing::info!(id = id, is_active = payload.is_active, "Menu item availability updated");
    Ok(Json(item))
}
