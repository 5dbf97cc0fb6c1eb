mod config;
mod error;
mod http_client;
mod providers;
mod relay;
mod server;

use std::net::SocketAddr;

use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Settings::load()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;
    let app = server::create_app(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Cyber AI relay running on http://{}", addr);
    tracing::info!("Health: http://localhost:{}/health", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
