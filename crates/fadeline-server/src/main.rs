use fadeline_server::{Server, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.bind_addr,
        side = config.game.side,
        timeout_ms = ?config.game.turn_timeout.map(|t| t.as_millis()),
        chain = config.game.chain_timeouts,
        "starting fadeline"
    );

    let server = Server::bind(config).await?;
    server.run().await
}
