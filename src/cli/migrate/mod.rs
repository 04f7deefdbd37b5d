//! Migrate command - applies or reverts PostgreSQL migrations

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{revert_last_migration, run_migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recent migration instead of applying pending ones
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let pool = crate::connect_database(&config.storage).await?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migration to revert"),
        }
    } else {
        let applied = run_migrations(&pool).await?;
        info!(applied, "Migrations applied");
    }

    Ok(())
}
