//! Level and subclass tier progression

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// The three unlock tiers of a subclass feature set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubclassTier {
    /// Always active
    Foundation,
    Specialization,
    Mastery,
}

impl SubclassTier {
    /// Tiers that need an explicit unlock flag
    pub const UNLOCKABLE: [SubclassTier; 2] = [SubclassTier::Specialization, SubclassTier::Mastery];

    pub fn requires_unlock(&self) -> bool {
        !matches!(self, SubclassTier::Foundation)
    }
}

impl fmt::Display for SubclassTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubclassTier::Foundation => write!(f, "Foundation"),
            SubclassTier::Specialization => write!(f, "Specialization"),
            SubclassTier::Mastery => write!(f, "Mastery"),
        }
    }
}
