use serde::{Deserialize, Serialize};

use crate::application::services::{ResourceSnapshot, RollResult};
use crate::domain::entities::{Character, EquippedItemEntry, InventoryEntry};
use crate::domain::value_objects::{
    AdditionalData, DualityOutcome, ResourceCounter, TraitScores,
};

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequestDto {
    pub name: String,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequestDto {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetEquippedRequestDto {
    pub equipped: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToggleSlotRequestDto {
    pub index: u8,
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetMaxRequestDto {
    pub max: u8,
}

#[derive(Debug, Default, Deserialize)]
pub struct RollRequestDto {
    /// Trait whose score is added to the roll
    #[serde(default, rename = "trait")]
    pub trait_name: Option<String>,
    #[serde(default)]
    pub modifier: i32,
}

#[derive(Debug, Serialize)]
pub struct EquippedItemResponseDto {
    pub item_id: String,
    pub quantity: u32,
    pub equipped: bool,
}

impl From<EquippedItemEntry> for EquippedItemResponseDto {
    fn from(e: EquippedItemEntry) -> Self {
        Self {
            item_id: e.item_id.to_string(),
            quantity: e.quantity,
            equipped: e.equipped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub level: u8,
    pub pronouns: Option<String>,
    pub background: String,
    pub ancestry_id: Option<String>,
    pub class_id: Option<String>,
    pub subclass_id: Option<String>,
    pub community_id: Option<String>,
    pub campaign_id: Option<String>,
    pub traits: TraitScores,
    pub hit_points: ResourceCounter,
    pub hope: ResourceCounter,
    pub stress: ResourceCounter,
    pub inventory: Vec<InventoryEntry>,
    pub equipped_items: Vec<EquippedItemResponseDto>,
    pub additional_data: AdditionalData,
    pub is_complete: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Character> for CharacterResponseDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            owner_id: c.owner_id,
            name: c.name,
            level: c.level,
            pronouns: c.pronouns,
            background: c.background,
            ancestry_id: c.ancestry_id.map(|id| id.to_string()),
            class_id: c.class_id.map(|id| id.to_string()),
            subclass_id: c.subclass_id.map(|id| id.to_string()),
            community_id: c.community_id.map(|id| id.to_string()),
            campaign_id: c.campaign_id.map(|id| id.to_string()),
            traits: c.traits,
            hit_points: c.hit_points,
            hope: c.hope,
            stress: c.stress,
            inventory: c.inventory,
            equipped_items: c.equipped_items.into_iter().map(Into::into).collect(),
            additional_data: c.additional_data,
            is_complete: c.is_complete,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RollResponseDto {
    pub hope_die: u8,
    pub fear_die: u8,
    pub modifier: i32,
    pub total: i32,
    pub outcome: DualityOutcome,
    pub resources: ResourceSnapshot,
}

impl From<RollResult> for RollResponseDto {
    fn from(r: RollResult) -> Self {
        Self {
            hope_die: r.roll.hope_die,
            fear_die: r.roll.fear_die,
            modifier: r.roll.modifier,
            total: r.roll.total,
            outcome: r.roll.outcome,
            resources: r.resources,
        }
    }
}
