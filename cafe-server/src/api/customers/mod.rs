//! Customer API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        // 公共自助查询 (中间件放行)
        .route("/lookup", get(handler::lookup))
        .route("/purchase", post(handler::purchase))
        .route("/claim-reward", post(handler::claim_reward))
}
