//! CLI module for the Accreditation Tracker
//!
//! Subcommands:
//! - `serve`: HTTP API
//! - `sync`: copy events and rosters from the tournament platform into the cache
//! - `create-user`: add a login account
//! - `migrate`: apply or revert database migrations

pub mod create_user;
pub mod migrate;
pub mod serve;
pub mod sync;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Accreditation Tracker - player accreditation and team compliance
#[derive(Parser)]
#[command(name = "accreditation-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Refresh the event cache from the tournament platform
    Sync(sync::SyncArgs),

    /// Create a login account
    CreateUser(create_user::CreateUserArgs),

    /// Apply pending migrations, or revert the latest one
    Migrate(migrate::MigrateArgs),
}

/// Load `.env` and the layered configuration, then start logging
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["accreditation-tracker", "serve", "--sync"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(args) if args.sync));

        let cli = Cli::try_parse_from(["accreditation-tracker", "sync", "--year", "2019"]).unwrap();
        assert!(matches!(cli.command, Command::Sync(args) if args.year == Some(2019)));

        let cli = Cli::try_parse_from(["accreditation-tracker", "migrate", "--revert"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate(args) if args.revert));
    }

    #[test]
    fn test_create_user_requires_username_and_email() {
        assert!(Cli::try_parse_from(["accreditation-tracker", "create-user"]).is_err());

        let cli = Cli::try_parse_from([
            "accreditation-tracker",
            "create-user",
            "--username",
            "ann",
            "--email",
            "ann@x.org",
            "--superuser",
        ])
        .unwrap();

        match cli.command {
            Command::CreateUser(args) => {
                assert_eq!(args.username, "ann");
                assert!(args.superuser);
                assert!(args.password.is_none());
            }
            _ => panic!("expected create-user"),
        }
    }
}
