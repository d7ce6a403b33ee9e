//! Duality dice - the Hope d12 and Fear d12 rolled for every action

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DUALITY_DIE_SIDES: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualityOutcome {
    WithHope,
    WithFear,
    /// Both dice show the same face
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualityRoll {
    pub hope_die: u8,
    pub fear_die: u8,
    pub modifier: i32,
    pub total: i32,
    pub outcome: DualityOutcome,
}

impl DualityRoll {
    pub fn from_dice(hope_die: u8, fear_die: u8, modifier: i32) -> Self {
        let outcome = if hope_die == fear_die {
            DualityOutcome::Critical
        } else if hope_die > fear_die {
            DualityOutcome::WithHope
        } else {
            DualityOutcome::WithFear
        };

        Self {
            hope_die,
            fear_die,
            modifier,
            total: i32::from(hope_die) + i32::from(fear_die) + modifier,
            outcome,
        }
    }

    pub fn roll<R: Rng + ?Sized>(rng: &mut R, modifier: i32) -> Self {
        let hope = rng.gen_range(1..=DUALITY_DIE_SIDES);
        let fear = rng.gen_range(1..=DUALITY_DIE_SIDES);
        Self::from_dice(hope, fear, modifier)
    }

    /// Whether the player gains a Hope from this roll
    pub fn grants_hope(&self) -> bool {
        matches!(self.outcome, DualityOutcome::WithHope | DualityOutcome::Critical)
    }

    /// Whether the player clears a Stress from this roll
    pub fn clears_stress(&self) -> bool {
        self.outcome == DualityOutcome::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_outcomes() {
        assert_eq!(DualityRoll::from_dice(9, 4, 0).outcome, DualityOutcome::WithHope);
        assert_eq!(DualityRoll::from_dice(2, 11, 0).outcome, DualityOutcome::WithFear);

        let critical = DualityRoll::from_dice(7, 7, 2);
        assert_eq!(critical.outcome, DualityOutcome::Critical);
        assert!(critical.grants_hope());
        assert!(critical.clears_stress());
    }

    #[test]
    fn test_total_includes_modifier() {
        assert_eq!(DualityRoll::from_dice(5, 3, -1).total, 7);
    }

    #[test]
    fn test_rolled_dice_are_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let roll = DualityRoll::roll(&mut rng, 0);
            assert!((1..=DUALITY_DIE_SIDES).contains(&roll.hope_die));
            assert!((1..=DUALITY_DIE_SIDES).contains(&roll.fear_die));
        }
    }
}
