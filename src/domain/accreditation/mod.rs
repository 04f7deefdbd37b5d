//! Accreditation domain

mod entity;
mod repository;
mod validation;
mod validity;

pub use entity::{
    Accreditation, AccreditationDraft, AccreditationId, AccreditationType, AccreditationUpsert,
};
pub use repository::AccreditationRepository;
pub use validation::{
    field_errors_for_row, parse_accreditation_date, validate_accreditation_date,
    AccreditationValidationError, FieldError,
};
pub use validity::{is_valid_since, valid_after, DEFAULT_VALIDITY_MONTHS};
