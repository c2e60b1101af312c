use tracing_subscriber::EnvFilter;

use userhub::{app, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = config::config().server.internal_port;
    tracing::info!("Starting userhub internal service");

    app::serve(app::internal_app(), port).await
}
