//! Character entity - player-owned Daggerheart characters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Ancestry, CharacterClass, Community, Subclass};
use crate::domain::value_objects::{
    AdditionalData, AdditionalDataPatch, AncestryId, CampaignId, CharacterId, ClassId,
    CommunityId, ItemId, ResourceCounter, ResourceKind, SubclassId, TraitScores,
    DEFAULT_HOPE_MAX, DEFAULT_STRESS_MAX, HOPE_CEILING, HOPE_FLOOR, MAX_LEVEL, MIN_LEVEL,
};

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_BACKGROUND_LENGTH: usize = 10000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CharacterError {
    #[error("Character name cannot be empty")]
    EmptyName,
    #[error("Character name cannot exceed {} characters", MAX_NAME_LENGTH)]
    NameTooLong,
    #[error("Character background cannot exceed {} characters", MAX_BACKGROUND_LENGTH)]
    BackgroundTooLong,
    #[error("Level must be between {min} and {max}, got {0}", min = MIN_LEVEL, max = MAX_LEVEL)]
    InvalidLevel(u8),
    #[error("Item {0} is not in this character's equipment")]
    ItemNotHeld(ItemId),
    #[error("Inventory has no entry at index {0}")]
    NoInventoryEntry(usize),
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
}

/// A catalog item held by a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItemEntry {
    pub item_id: ItemId,
    pub quantity: u32,
    pub equipped: bool,
}

/// A freeform inventory line that never affects derived stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    /// The owning user
    pub owner_id: String,
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub background: String,

    pub ancestry_id: Option<AncestryId>,
    pub class_id: Option<ClassId>,
    pub subclass_id: Option<SubclassId>,
    pub community_id: Option<CommunityId>,
    pub campaign_id: Option<CampaignId>,

    #[serde(default)]
    pub traits: TraitScores,
    pub hit_points: ResourceCounter,
    pub hope: ResourceCounter,
    pub stress: ResourceCounter,

    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
    #[serde(default)]
    pub equipped_items: Vec<EquippedItemEntry>,
    #[serde(default)]
    pub additional_data: AdditionalData,

    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CharacterId::new(),
            owner_id: owner_id.into(),
            name: name.into(),
            level: MIN_LEVEL,
            pronouns: None,
            background: String::new(),
            ancestry_id: None,
            class_id: None,
            subclass_id: None,
            community_id: None,
            campaign_id: None,
            traits: TraitScores::default(),
            hit_points: ResourceCounter::empty(0),
            hope: ResourceCounter::empty(DEFAULT_HOPE_MAX),
            stress: ResourceCounter::empty(DEFAULT_STRESS_MAX),
            inventory: Vec::new(),
            equipped_items: Vec::new(),
            additional_data: AdditionalData::default(),
            is_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate_name(name: &str) -> Result<(), CharacterError> {
        if name.trim().is_empty() {
            return Err(CharacterError::EmptyName);
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(CharacterError::NameTooLong);
        }
        Ok(())
    }

    pub fn resource(&self, kind: ResourceKind) -> &ResourceCounter {
        match kind {
            ResourceKind::Hope => &self.hope,
            ResourceKind::Stress => &self.stress,
            ResourceKind::HitPoints => &self.hit_points,
        }
    }

    pub fn resource_mut(&mut self, kind: ResourceKind) -> &mut ResourceCounter {
        match kind {
            ResourceKind::Hope => &mut self.hope,
            ResourceKind::Stress => &mut self.stress,
            ResourceKind::HitPoints => &mut self.hit_points,
        }
    }

    /// Set the hope maximum, clamped to the allowed range
    pub fn set_hope_max(&mut self, max: u8) -> u8 {
        let max = max.clamp(HOPE_FLOOR, HOPE_CEILING);
        self.hope.set_max(max);
        max
    }

    /// Add a catalog item; an item already held aggregates its quantity
    pub fn add_item(&mut self, item_id: ItemId, quantity: u32) -> Result<(), CharacterError> {
        if quantity == 0 {
            return Err(CharacterError::ZeroQuantity);
        }
        match self.equipped_items.iter_mut().find(|e| e.item_id == item_id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.equipped_items.push(EquippedItemEntry {
                item_id,
                quantity,
                equipped: false,
            }),
        }
        Ok(())
    }

    pub fn set_equipped(&mut self, item_id: ItemId, equipped: bool) -> Result<(), CharacterError> {
        let entry = self
            .equipped_items
            .iter_mut()
            .find(|e| e.item_id == item_id)
            .ok_or(CharacterError::ItemNotHeld(item_id))?;
        entry.equipped = equipped;
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: &ItemId) -> bool {
        if let Some(pos) = self.equipped_items.iter().position(|e| &e.item_id == item_id) {
            self.equipped_items.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn add_inventory_entry(&mut self, entry: InventoryEntry) -> Result<(), CharacterError> {
        if entry.quantity == 0 {
            return Err(CharacterError::ZeroQuantity);
        }
        self.inventory.push(entry);
        Ok(())
    }

    pub fn remove_inventory_entry(&mut self, index: usize) -> Result<InventoryEntry, CharacterError> {
        if index >= self.inventory.len() {
            return Err(CharacterError::NoInventoryEntry(index));
        }
        Ok(self.inventory.remove(index))
    }

    pub fn level_up(&mut self) -> Result<u8, CharacterError> {
        if self.level >= MAX_LEVEL {
            return Err(CharacterError::InvalidLevel(self.level.saturating_add(1)));
        }
        self.level += 1;
        Ok(self.level)
    }

    /// Apply a partial update. Nothing is changed if validation fails.
    pub fn apply_patch(&mut self, patch: CharacterPatch) -> Result<(), CharacterError> {
        patch.validate()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(pronouns) = patch.pronouns {
            self.pronouns = if pronouns.trim().is_empty() {
                None
            } else {
                Some(pronouns)
            };
        }
        if let Some(background) = patch.background {
            self.background = background;
        }
        if patch.ancestry_id.is_some() {
            self.ancestry_id = patch.ancestry_id;
        }
        if patch.class_id.is_some() {
            self.class_id = patch.class_id;
        }
        if patch.subclass_id.is_some() {
            self.subclass_id = patch.subclass_id;
        }
        if patch.community_id.is_some() {
            self.community_id = patch.community_id;
        }
        if let Some(traits) = patch.traits {
            self.traits = traits;
        }
        if let Some(max) = patch.hit_points_max {
            self.hit_points.set_max(max);
        }
        if let Some(current) = patch.hit_points {
            self.hit_points.set_current(current);
        }
        if let Some(max) = patch.hope_max {
            self.set_hope_max(max);
        }
        if let Some(current) = patch.hope {
            self.hope.set_current(current);
        }
        if let Some(current) = patch.stress {
            self.stress.set_current(current);
        }
        if let Some(inventory) = patch.inventory {
            self.inventory = inventory;
        }
        if let Some(equipped_items) = patch.equipped_items {
            self.equipped_items = equipped_items;
        }
        if let Some(additional) = patch.additional_data {
            self.additional_data.apply(additional);
        }
        if let Some(is_complete) = patch.is_complete {
            self.is_complete = is_complete;
        }

        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update of a character; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestry_id: Option<AncestryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass_id: Option<SubclassId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<TraitScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_points_max: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hope: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hope_max: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<InventoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipped_items: Option<Vec<EquippedItemEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<AdditionalDataPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
}

impl CharacterPatch {
    pub fn is_empty(&self) -> bool {
        self == &CharacterPatch::default()
    }

    /// A patch carrying the current value of one resource counter
    pub fn resource(kind: ResourceKind, counter: &ResourceCounter) -> Self {
        let mut patch = Self::default();
        match kind {
            ResourceKind::Hope => {
                patch.hope = Some(counter.current());
                patch.hope_max = Some(counter.max());
            }
            ResourceKind::Stress => patch.stress = Some(counter.current()),
            ResourceKind::HitPoints => patch.hit_points = Some(counter.current()),
        }
        patch
    }

    pub fn validate(&self) -> Result<(), CharacterError> {
        if let Some(ref name) = self.name {
            Character::validate_name(name)?;
        }
        if let Some(level) = self.level {
            if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
                return Err(CharacterError::InvalidLevel(level));
            }
        }
        if let Some(ref background) = self.background {
            if background.len() > MAX_BACKGROUND_LENGTH {
                return Err(CharacterError::BackgroundTooLong);
            }
        }
        Ok(())
    }

    /// Fold a later patch over this one; the later value wins per field
    pub fn merge(self, newer: CharacterPatch) -> CharacterPatch {
        let additional_data = match (self.additional_data, newer.additional_data) {
            (Some(older), Some(newer)) => Some(older.merge(newer)),
            (older, newer) => newer.or(older),
        };

        CharacterPatch {
            name: newer.name.or(self.name),
            level: newer.level.or(self.level),
            pronouns: newer.pronouns.or(self.pronouns),
            background: newer.background.or(self.background),
            ancestry_id: newer.ancestry_id.or(self.ancestry_id),
            class_id: newer.class_id.or(self.class_id),
            subclass_id: newer.subclass_id.or(self.subclass_id),
            community_id: newer.community_id.or(self.community_id),
            traits: newer.traits.or(self.traits),
            hit_points: newer.hit_points.or(self.hit_points),
            hit_points_max: newer.hit_points_max.or(self.hit_points_max),
            hope: newer.hope.or(self.hope),
            hope_max: newer.hope_max.or(self.hope_max),
            stress: newer.stress.or(self.stress),
            inventory: newer.inventory.or(self.inventory),
            equipped_items: newer.equipped_items.or(self.equipped_items),
            additional_data,
            is_complete: newer.is_complete.or(self.is_complete),
        }
    }
}

/// A character together with the catalog records its references resolve to
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDetails {
    pub character: Character,
    pub class: Option<CharacterClass>,
    pub subclass: Option<Subclass>,
    pub ancestry: Option<Ancestry>,
    pub community: Option<Community>,
}

pub const UNKNOWN: &str = "Unknown";

impl CharacterDetails {
    pub fn bare(character: Character) -> Self {
        Self {
            character,
            class: None,
            subclass: None,
            ancestry: None,
            community: None,
        }
    }

    pub fn base_evasion(&self) -> Option<i32> {
        self.class.as_ref().map(|c| c.base_evasion)
    }

    pub fn class_name(&self) -> &str {
        self.class.as_ref().map_or(UNKNOWN, |c| c.name.as_str())
    }

    pub fn subclass_name(&self) -> &str {
        self.subclass.as_ref().map_or(UNKNOWN, |s| s.name.as_str())
    }

    pub fn ancestry_name(&self) -> &str {
        self.ancestry.as_ref().map_or(UNKNOWN, |a| a.name.as_str())
    }

    pub fn community_name(&self) -> &str {
        self.community.as_ref().map_or(UNKNOWN, |c| c.name.as_str())
    }
}
