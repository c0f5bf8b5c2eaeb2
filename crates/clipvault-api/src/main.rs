mod api_doc;
mod constants;
mod error;
mod handlers;
mod middleware;
mod setup;
mod state;
mod telemetry;
mod utils;

use clipvault_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    telemetry::init_telemetry();

    // Initialize the application (database, providers, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
