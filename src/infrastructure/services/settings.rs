//! Settings shared by the tracker services

use crate::domain::accreditation::DEFAULT_VALIDITY_MONTHS;

/// Site-wide behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Every user administers every team
    pub demo_mode: bool,
    pub validity_months: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            demo_mode: false,
            validity_months: DEFAULT_VALIDITY_MONTHS,
        }
    }
}

impl TrackerSettings {
    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = demo_mode;
        self
    }

    pub fn with_validity_months(mut self, months: u32) -> Self {
        self.validity_months = months;
        self
    }
}
