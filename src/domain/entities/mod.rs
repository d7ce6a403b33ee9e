//! Domain entities - Core business objects with identity

mod campaign;
mod character;
mod class;
mod feature;
mod heritage;
mod item;

pub use campaign::{generate_invite_code, normalize_invite_code, Campaign, CampaignError};
pub use character::{
    Character, CharacterDetails, CharacterError, CharacterPatch, EquippedItemEntry,
    InventoryEntry, MAX_BACKGROUND_LENGTH,
};
pub use class::{CharacterClass, Subclass};
pub use feature::Feature;
pub use heritage::{Ancestry, Community};
pub use item::{DamageThresholds, Item, ItemKind};
