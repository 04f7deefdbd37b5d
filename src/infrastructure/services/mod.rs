//! Infrastructure services

mod accreditation_service;
mod event_service;
mod settings;

pub use accreditation_service::{AccreditationForm, AccreditationService, SubmissionOutcome};
pub use event_service::{EventListing, EventPage, EventService};
pub use settings::TrackerSettings;
