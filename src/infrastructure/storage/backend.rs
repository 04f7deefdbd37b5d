//! Store backend selection

use crate::domain::DomainError;

/// Where accreditations and users are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageType {
    #[default]
    InMemory,
    Postgres,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "in_memory"),
            StorageType::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StorageType::InMemory),
            "postgres" | "postgresql" => Ok(StorageType::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage backend: {}. Valid backends: in_memory, postgres",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("postgresql".parse::<StorageType>().unwrap(), StorageType::Postgres);
        assert_eq!("IN_MEMORY".parse::<StorageType>().unwrap(), StorageType::InMemory);
        assert!("sqlite".parse::<StorageType>().is_err());
        assert_eq!(StorageType::Postgres.to_string(), "postgres");
    }
}
