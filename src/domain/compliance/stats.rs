//! Team compliance counters

use serde::{Deserialize, Serialize};

use crate::domain::accreditation::AccreditationType;

/// Per-team counts of eligible players and their accreditation tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(rename = "Standard")]
    pub standard: usize,
    #[serde(rename = "Advanced")]
    pub advanced: usize,
    #[serde(rename = "Players")]
    pub players: usize,
    pub complying: bool,
}

impl TeamStats {
    pub fn new(standard: usize, advanced: usize, players: usize) -> Self {
        Self {
            standard,
            advanced,
            players,
            complying: is_complying(standard, advanced, players),
        }
    }

    /// Count one more eligible player, with their tier if accredited
    pub fn with_player(self, accreditation: Option<AccreditationType>) -> Self {
        let (standard, advanced) = match accreditation {
            Some(AccreditationType::Standard) => (self.standard + 1, self.advanced),
            Some(AccreditationType::Advanced) => (self.standard, self.advanced + 1),
            None => (self.standard, self.advanced),
        };

        Self::new(standard, advanced, self.players + 1)
    }
}

impl Default for TeamStats {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Every player accredited, and at least half of them at the advanced tier
pub fn is_complying(standard: usize, advanced: usize, players: usize) -> bool {
    standard + advanced == players && advanced * 2 >= players
}
