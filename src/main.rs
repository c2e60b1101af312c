use tracing_subscriber::EnvFilter;

use userhub::{app, config, database::DatabaseManager, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local / .env so cargo run picks up DATABASE_URL, JWT_PASSPHRASE, etc.
    config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting userhub in {:?} mode", config.environment);

    let port = config.server.external_port;
    let state = AppState::connect(config).await?;

    app::serve(app::external_app(state), port).await?;

    DatabaseManager::close_all().await;
    Ok(())
}
