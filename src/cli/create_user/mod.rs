//! Create-user command

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::StorageType;
use crate::infrastructure::user::CreateUserRequest;

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub username: String,

    /// Must match the address the platform holds for this person
    #[arg(long)]
    pub email: String,

    /// Falls back to the USER_PASSWORD environment variable
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub superuser: bool,

    /// Account id; a random UUID when omitted
    #[arg(long)]
    pub id: Option<String>,
}

pub async fn run(args: CreateUserArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let backend: StorageType = config.storage.backend.parse()?;
    if backend == StorageType::InMemory {
        anyhow::bail!("create-user needs storage.backend = \"postgres\"; in-memory users vanish on exit");
    }

    let password = args
        .password
        .or_else(|| std::env::var("USER_PASSWORD").ok())
        .ok_or_else(|| anyhow::anyhow!("--password or USER_PASSWORD is required"))?;

    let pool = crate::connect_database(&config.storage).await?;
    crate::infrastructure::storage::run_migrations(&pool).await?;

    let user_service = crate::create_user_service(backend, Some(&pool));
    let user = user_service
        .create(CreateUserRequest {
            id: args.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            username: args.username,
            email: args.email,
            password,
            is_superuser: args.superuser,
        })
        .await?;

    info!(user_id = %user.id(), username = %user.username(), "User created");
    println!("Created user '{}' ({})", user.username(), user.id());

    Ok(())
}
