//! Access token issuance for operators and integrations.

use clap::{Args, Subcommand};

use slotkeeper_auth::JwtEncoder;
use slotkeeper_core::error::AppError;
use slotkeeper_entity::user::UserRole;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Role accepted on the command line
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
    /// Full access
    Admin,
    /// Reservation triage
    Subadmin,
    /// Public booking only
    User,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Subadmin => UserRole::Subadmin,
            RoleArg::User => UserRole::User,
        }
    }
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a signed access token
    Issue {
        /// Subject placed in the `sub` claim
        #[arg(short, long)]
        subject: String,
        /// Role placed in the token
        #[arg(short, long, value_enum, default_value = "admin")]
        role: RoleArg,
        /// Lifetime in minutes, defaults to `auth.jwt_access_ttl_minutes`
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let encoder = JwtEncoder::new(&config.auth);

    match &args.command {
        TokenCommand::Issue {
            subject,
            role,
            ttl_minutes,
        } => {
            let token = match ttl_minutes {
                Some(ttl) => encoder.issue_with_ttl(subject, (*role).into(), *ttl)?,
                None => encoder.issue(subject, (*role).into())?,
            };
            match format {
                OutputFormat::Json => output::print_json(&token),
                OutputFormat::Table => {
                    output::print_kv("Subject", subject);
                    output::print_kv("Expires at", &token.expires_at.to_rfc3339());
                    println!("{}", token.access_token);
                }
            }
        }
    }

    Ok(())
}
