use accreditation_tracker::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Sync(args) => cli::sync::run(args).await,
        Command::CreateUser(args) => cli::create_user::run(args).await,
        Command::Migrate(args) => cli::migrate::run(args).await,
    }
}
