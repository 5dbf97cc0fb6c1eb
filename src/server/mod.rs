pub mod cors;
pub mod handlers;
pub(crate) mod rate_limit;
pub(crate) mod util;

use crate::config::Settings;
use crate::error::{Result as AppResult, internal_error_response};
use crate::providers::{GeminiProvider, TextProvider};
use crate::relay::ChatRelay;
use crate::server::rate_limit::RateLimiter;
use axum::Router;
use axum::response::Response;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub relay: Arc<ChatRelay>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Settings, provider: Arc<dyn TextProvider>) -> AppResult<Self> {
        let relay = ChatRelay::with_defaults(provider)?;
        let rate_limiter = RateLimiter::new(&config.rate_limit);
        Ok(Self {
            config,
            relay: Arc::new(relay),
            rate_limiter: Arc::new(rate_limiter),
        })
    }
}

pub fn create_app(config: Settings) -> AppResult<Router> {
    let provider = GeminiProvider::new(&config.provider, &config.generation)?;
    let app_state = AppState::new(config, Arc::new(provider))?;
    Ok(build_router(Arc::new(app_state)))
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = cors::cors_layer(&app_state.config.cors);
    let app = handlers::routes(app_state.clone()).with_state(app_state);
    with_layers(app, cors)
}

fn with_layers(app: Router, cors: tower_http::cors::CorsLayer) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Server error: {}", detail);
    internal_error_response()
}
