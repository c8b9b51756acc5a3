use media_config::GateConfig;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = GateConfig::from_env()?;
    let addr = config.listen_addr;
    let mode = config.mode;
    let state = media_gate::AppState::from_config(config)?;
    let configured = state.plugin.is_configured();

    let listener = TcpListener::bind(addr).await?;
    info!(%mode, configured, "listening on {}", listener.local_addr()?);
    axum::serve(listener, media_gate::app(state)).await?;
    Ok(())
}
