use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Endpoint {method} {path} not found")]
    NotFound { method: String, path: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            RelayError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Not Found", "message": self.to_string() })),
            )
                .into_response(),
            RelayError::RateLimited { retry_after_secs } => {
                let mut resp = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": "Too Many Requests", "message": RATE_LIMIT_MESSAGE })),
                )
                    .into_response();
                resp.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                resp
            }
            // 内部错误仅记录详情，对外统一返回通用文案
            RelayError::Http(_) | RelayError::Io(_) | RelayError::Config(_) => {
                tracing::error!(error = %self, "Server error");
                internal_error_response()
            }
        }
    }
}

pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal Server Error",
            "message": INTERNAL_ERROR_MESSAGE,
        })),
    )
        .into_response()
}
