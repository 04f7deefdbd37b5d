use thiserror::Error;

/// Errors shared by the stores, the cache, the upstream client and the services
///
/// The HTTP layer maps each variant to one status code; see `ApiError`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    /// A unique column (email, username, WFDF id) is already taken
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The user does not administer the team
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Snapshot cache unreachable, or a cached blob failed to decode
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Tournament platform rejected a request or returned garbage
    #[error("Upstream error: {message}")]
    Upstream { message: String },
}

macro_rules! constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        impl DomainError {
            $(
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::$variant {
                        message: message.into(),
                    }
                }
            )*
        }
    };
}

constructors! {
    not_found => NotFound,
    validation => Validation,
    invalid_id => InvalidId,
    conflict => Conflict,
    permission_denied => PermissionDenied,
    configuration => Configuration,
    internal => Internal,
    storage => Storage,
    cache => Cache,
    upstream => Upstream,
}

impl DomainError {
    /// Failures of a collaborator rather than of the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::Internal { .. }
                | Self::Storage { .. }
                | Self::Cache { .. }
                | Self::Upstream { .. }
        )
    }
}
