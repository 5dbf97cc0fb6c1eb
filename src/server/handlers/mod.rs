use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::server::{AppState, rate_limit};

mod chat;
mod meta;

pub fn routes(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    // 限流挂在整个路由上，未匹配的 /api/* 也计数
    Router::new()
        .route("/health", get(meta::health))
        .route("/", get(meta::root))
        .route("/api/chat", post(chat::chat))
        .fallback(meta::not_found)
        .method_not_allowed_fallback(meta::not_found)
        .layer(middleware::from_fn_with_state(
            app_state,
            rate_limit::limit_requests,
        ))
}
