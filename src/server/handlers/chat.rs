use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{RelayError, Result as AppResult};
use crate::relay::message::{ChatResponse, MESSAGES_REQUIRED};
use crate::server::AppState;

pub async fn chat(
    State(app_state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!("Rejected chat body: {}", rejection.body_text());
        RelayError::BadRequest(MESSAGES_REQUIRED.to_string())
    })?;

    let response = app_state.relay.handle(&body).await?;
    tracing::info!(
        fallback = response.is_fallback(),
        reply_chars = response.content().chars().count(),
        "Chat request served"
    );
    Ok(Json(response))
}
