use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pubsub_walkthrough::cloud::PubSubBus;
use pubsub_walkthrough::config::Config;
use pubsub_walkthrough::error::Error;
use pubsub_walkthrough::walkthrough;

async fn run(config: Config) -> Result<(), Error> {
    let bus = Arc::new(
        PubSubBus::connect(&config.emulator_host, &config.project_id)
            .await
            .map_err(Error::Connect)?,
    );
    let result = walkthrough::run(bus.clone(), &config, std::io::stdout()).await;
    bus.shutdown().await;
    result.map(|summary| {
        tracing::debug!(
            "published={} received={}",
            summary.published.len(),
            summary.received.len()
        )
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    tracing::debug!("using pubsub emulator at {}", config.emulator_host);
    if let Err(e) = run(config).await {
        tracing::error!("pubsub walkthrough failed: {e}");
        std::process::exit(1);
    }
}
