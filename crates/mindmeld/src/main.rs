use mindmeld::prelude::*;
use mindmeld::TransportError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), MindmeldError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let server = MindmeldServerBuilder::new().config(config).build().await?;

    let addr = server.local_addr().map_err(TransportError::AcceptFailed)?;
    tracing::info!(%addr, "mindmeld listening");

    server.run().await
}
