use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use chrono::{SecondsFormat, Utc};

// ISO-8601, millisecond precision, `Z` suffix
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Rate-limit key: peer address when the server was started with connect info
pub fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
