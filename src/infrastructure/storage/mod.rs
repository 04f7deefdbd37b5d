//! Storage infrastructure

mod backend;
mod migrations;
mod postgres;

pub use backend::StorageType;
pub use migrations::{revert_last_migration, run_migrations, Migration, PostgresMigrator, MIGRATIONS};
pub use postgres::{is_unique_violation, ping, PostgresConfig};
