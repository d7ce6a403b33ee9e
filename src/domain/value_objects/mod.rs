//! Value objects - Immutable objects defined by their attributes

mod additional_data;
mod dice;
mod ids;
mod modifiers;
mod progression;
mod resources;
mod traits;

pub use additional_data::{AdditionalData, AdditionalDataPatch, Experience};
pub use dice::{DualityOutcome, DualityRoll};
pub use ids::*;
pub use modifiers::{stat_keys, ModifierMap};
pub use progression::{SubclassTier, MAX_LEVEL, MIN_LEVEL};
pub use resources::{
    ResourceCounter, ResourceKind, DEFAULT_HOPE_MAX, DEFAULT_STRESS_MAX, HOPE_CEILING, HOPE_FLOOR,
};
pub use traits::{Trait, TraitScores};
