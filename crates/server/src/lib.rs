pub mod config;
pub mod handlers;
pub mod router;
pub mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

pub use config::{ConfigError, Settings};
pub use router::create_router;

pub struct AppState {
    pub settings: Settings,
}

pub const DEFAULT_LOG_FILTER: &str = "extrato_server=info,extrato_import=info,tower_http=info";

/// Binds the configured address and serves until the process exits.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr().parse::<SocketAddr>()?;
    let app = create_router(Arc::new(AppState { settings }));

    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
