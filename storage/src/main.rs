use tracing_subscriber::EnvFilter;

use storage_walkthrough::config::Config;
use storage_walkthrough::gcs::GcsStore;
use storage_walkthrough::walkthrough;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    tracing::debug!("using storage endpoint {}", config.endpoint);
    let store = GcsStore::new(&config.endpoint);
    if let Err(e) = walkthrough::run(&store, &config, &mut std::io::stdout()).await {
        tracing::error!("storage walkthrough failed: {e}");
        std::process::exit(1);
    }
}
