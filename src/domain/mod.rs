//! Domain layer - Core business logic and entities

pub mod accreditation;
pub mod cache;
pub mod compliance;
pub mod error;
pub mod event;
pub mod intake;
pub mod user;

pub use accreditation::{
    Accreditation, AccreditationDraft, AccreditationId, AccreditationRepository,
    AccreditationType, AccreditationUpsert, FieldError,
};
pub use cache::{Cache, CacheExt};
pub use compliance::{admin_teams, group_registrations_by_team, TeamAggregate, TeamStats};
pub use error::DomainError;
pub use event::{Event, EventSource, Person, Registration, Role};
pub use intake::{AccreditationFormRow, FormErrors, IntakePlan};
pub use user::{User, UserId, UserRepository};
