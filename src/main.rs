//! chatvault - Entry Point
//!
//! A chat-driven file manager confining remote operators to a set of
//! administrator-declared directory roots.

use std::sync::Arc;

use env_logger;
use log::{error, info};

use chatvault::config::VaultConfig;
use chatvault::router::{Router, build_managers};
use chatvault::transport::console;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chatvault...");

    let config = match VaultConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let managers = match build_managers(&config) {
        Ok(managers) => managers,
        Err(e) => {
            error!("Failed to initialize file managers: {}", e);
            std::process::exit(1);
        }
    };

    info!("Initialized {} file managers", managers.len());

    let router = Arc::new(Router::new(config.operator_ids.clone(), managers));

    // The console adapter stands in for the chat transport and acts as the
    // first configured operator.
    let operator = config.operator_ids.first().cloned().unwrap_or_default();

    console::run(router, operator).await;
}
