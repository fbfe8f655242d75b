use anyhow::Result;
use clima_views::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clima_views=info".parse()?),
        )
        .init();

    info!("Starting clima views");

    // Load configuration from environment
    let config = config::Config::from_env()?;

    server::serve(config).await
}
