//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod reservations;
pub mod serve;
pub mod slots;
pub mod token;

use clap::{Parser, Subcommand};
use tracing::debug;

use slotkeeper_api::AppState;
use slotkeeper_core::config::AppConfig;
use slotkeeper_core::error::AppError;
use slotkeeper_database::Stores;
use slotkeeper_entity::user::UserRole;
use slotkeeper_service::RequestContext;

use crate::output::OutputFormat;

/// Slotkeeper: time-slot availability engine for escape-room bookings
#[derive(Debug, Parser)]
#[command(name = "slotkeeper", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Issue access tokens
    Token(token::TokenArgs),
    /// Generate and manage time slots
    Slots(slots::SlotsArgs),
    /// Inspect reservations
    Reservations(reservations::ReservationsArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Token(args) => token::execute(args, &self.config, self.format),
            Commands::Slots(args) => slots::execute(args, &self.config, self.format).await,
            Commands::Reservations(args) => {
                reservations::execute(args, &self.config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &self.config),
        }
    }
}

/// Helper: load configuration from file plus `SLOTKEEPER__` overrides
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect the configured store and wire the services
pub async fn open_state(config_path: &str) -> Result<AppState, AppError> {
    let config = load_config(config_path)?;
    let stores = Stores::from_config(&config.database).await?;
    debug!(config = config_path, storage = stores.backend_name(), "Services wired");
    Ok(AppState::new(config, stores))
}

/// Context for operator commands run from a shell
pub fn operator_context() -> RequestContext {
    RequestContext::new("cli", UserRole::Admin)
}
