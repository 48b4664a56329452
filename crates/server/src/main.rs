use anyhow::Context;
use extrato_server::{Settings, DEFAULT_LOG_FILTER};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    extrato_server::serve(settings).await
}
