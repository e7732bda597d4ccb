//! Auth API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 登录接口无需认证 (中间件放行)
        .route("/login", post(handler::login))
        .route("/profile", get(handler::profile).put(handler::update_profile))
        .route("/change-password", post(handler::change_password))
}
