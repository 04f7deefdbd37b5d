//! Accreditation store implementations

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryAccreditationRepository;
pub use postgres_repository::PostgresAccreditationRepository;
