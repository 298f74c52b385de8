use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use health_log_service::{config::Config, state::AppState, utils::logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::init();

    let config = Config::load().context("configuration error")?;
    info!(log_file = %config.log_file.display(), "Initializing state...");
    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize application state")?;

    health_log_service::serve(config, state).await
}
