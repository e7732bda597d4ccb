//! Upload API 模块
//!
//! 图片上传 (需认证) 与图片读取 (公共)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/upload", post(handler::upload))
        .route("/api/image/{filename}", get(handler::serve_image))
}
