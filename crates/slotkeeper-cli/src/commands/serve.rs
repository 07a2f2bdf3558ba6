//! Start the Slotkeeper server.

use clap::Args;
use tracing::info;

use slotkeeper_api::AppState;
use slotkeeper_core::error::AppError;
use slotkeeper_database::Stores;

use crate::output;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Use the in-memory store regardless of configuration
    #[arg(long)]
    pub memory: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    let stores = if args.memory {
        Stores::memory()
    } else {
        Stores::from_config(&config.database).await?
    };

    info!(config = config_path, memory = args.memory, "Starting server from the command line");
    println!("Starting Slotkeeper server...");
    output::print_kv("Address", &config.server.bind_addr());
    output::print_kv("Storage", stores.backend_name());

    slotkeeper_api::serve(AppState::new(config, stores)).await
}
