//! Character trait scores

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The six character traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Agility,
    Strength,
    Finesse,
    Instinct,
    Presence,
    Knowledge,
}

impl Trait {
    pub const ALL: [Trait; 6] = [
        Trait::Agility,
        Trait::Strength,
        Trait::Finesse,
        Trait::Instinct,
        Trait::Presence,
        Trait::Knowledge,
    ];
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trait::Agility => "Agility",
            Trait::Strength => "Strength",
            Trait::Finesse => "Finesse",
            Trait::Instinct => "Instinct",
            Trait::Presence => "Presence",
            Trait::Knowledge => "Knowledge",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Trait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trait::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown trait: {}", s))
    }
}

/// Modifiers a new character distributes across their traits
pub const STARTING_TRAIT_ARRAY: [i8; 6] = [2, 1, 1, 0, 0, -1];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitScores {
    pub agility: i8,
    pub strength: i8,
    pub finesse: i8,
    pub instinct: i8,
    pub presence: i8,
    pub knowledge: i8,
}

impl TraitScores {
    pub fn get(&self, t: Trait) -> i8 {
        match t {
            Trait::Agility => self.agility,
            Trait::Strength => self.strength,
            Trait::Finesse => self.finesse,
            Trait::Instinct => self.instinct,
            Trait::Presence => self.presence,
            Trait::Knowledge => self.knowledge,
        }
    }

    fn values(&self) -> [i8; 6] {
        Trait::ALL.map(|t| self.get(t))
    }

    /// Whether the scores are a permutation of the starting array
    pub fn is_starting_distribution(&self) -> bool {
        let mut values = self.values();
        values.sort_unstable();
        let mut expected = STARTING_TRAIT_ARRAY;
        expected.sort_unstable();
        values == expected
    }
}
