//! Main entry point for the discovery store replica.

use clap::Parser;
use tracing::info;

use discovery_server::{
    Cli, Configuration, DiscoveryServer,
    startup::{self, wait_for_termination},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let configuration = Configuration::load(&cli)?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let config = configuration.discovery_config();
    info!(
        "Starting discovery store: max_age={}ms, expiration_enabled={}, expiration_interval={}ms",
        config.max_age.as_millis(),
        config.expiration_enabled,
        config.expiration_interval.as_millis()
    );

    let server = DiscoveryServer::standalone(config);
    let monitor = server.start();

    wait_for_termination().await;

    server.shutdown();
    if let Some(handle) = monitor {
        handle.await?;
    }

    info!("Discovery store stopped");
    Ok(())
}
