//! Serve command - runs the HTTP API

use std::net::SocketAddr;

use clap::Args;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::create_router_with_state;
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Fill the cache from the tournament platform before accepting requests
    ///
    /// Needed with the in-memory cache, which starts empty in every process.
    #[arg(long)]
    pub sync: bool,
}

/// Run the API server
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let state = crate::create_app_state_with_config(&config).await?;

    if args.sync {
        let sync = crate::create_sync_service(&config, state.cache.clone())?;
        match sync.run(None).await {
            Ok(report) => info!(
                events = report.events,
                registrations = report.registrations,
                "Initial sync finished"
            ),
            Err(e) => error!(error = %e, "Initial sync failed, serving without event data"),
        }
    }

    let app = create_router_with_state(state);

    let addr = build_socket_addr(&config)?;
    info!(%addr, "Starting server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
