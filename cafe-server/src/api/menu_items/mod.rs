//! Menu Item API 模块

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // 公共菜单 (无需认证，中间件放行)
        .route("/api/menu", get(handler::public_menu))
        .nest("/api/menu-items", menu_item_routes())
}

fn menu_item_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete)
                .patch(handler::set_availability),
        )
}
