//! Menu Item Model

use serde::{Deserialize, Serialize};

use super::customer::DrinkCategory;

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub category: DrinkCategory,
    pub price: f64,
    pub image: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub category: DrinkCategory,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Update menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub category: Option<DrinkCategory>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
