use axum::Json;
use axum::http::{Method, Uri};
use serde_json::{Value, json};

use crate::error::RelayError;
use crate::relay::persona::CREATOR;
use crate::server::util::iso_timestamp;

pub const SERVICE_NAME: &str = "Cyber AI Backend";

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": iso_timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": format!("{} Server", SERVICE_NAME),
        "endpoints": {
            "health": "GET /health",
            "chat": "POST /api/chat",
        },
        "creator": CREATOR,
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> RelayError {
    RelayError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
