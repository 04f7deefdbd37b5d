//! Sync command - refreshes the event cache from the tournament platform

use clap::Args;
use tracing::info;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only keep events starting in this year
    #[arg(long)]
    pub year: Option<i32>,
}

/// Run one sync against the configured cache
///
/// Only useful with a shared cache such as Redis; the in-memory cache dies
/// with this process. Use `serve --sync` in that case.
pub async fn run(args: SyncArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let cache = crate::create_cache_from_config(&config.cache).await?;
    let sync = crate::create_sync_service(&config, cache)?;

    let report = sync.run(args.year).await?;
    info!(
        events = report.events,
        registrations = report.registrations,
        year = ?args.year,
        "Sync finished"
    );

    Ok(())
}
