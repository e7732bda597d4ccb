//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理员认证接口
//! - [`menu_items`] - 菜单管理接口 (含公共菜单)
//! - [`customers`] - 客户/购买/奖励兑换接口
//! - [`rewards`] - 奖励看板接口
//! - [`dashboard`] - 统计看板接口
//! - [`upload`] - 图片上传与读取接口

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod menu_items;
pub mod rewards;
pub mod upload;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// 组装完整路由
///
/// 认证中间件应用于全部路由；公共路径在中间件内部放行。
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(menu_items::router())
        .merge(customers::router())
        .merge(rewards::router())
        .merge(dashboard::router())
        .merge(upload::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
