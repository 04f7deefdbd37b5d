//! Validity window of an accreditation relative to an event

use chrono::{Months, NaiveDate};

/// Accreditations stay valid for this many months
pub const DEFAULT_VALIDITY_MONTHS: u32 = 18;

/// Earliest accreditation date still valid for an event ending on `event_end`
///
/// Calendar months; the day is clamped to the end of the target month.
pub fn valid_after(event_end: NaiveDate, validity_months: u32) -> NaiveDate {
    event_end
        .checked_sub_months(Months::new(validity_months))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether an accreditation dated `accreditation_date` counts, given the
/// cutoff from [`valid_after`]; the cutoff day itself counts
pub fn is_valid_since(accreditation_date: NaiveDate, cutoff: NaiveDate) -> bool {
    accreditation_date >= cutoff
}
