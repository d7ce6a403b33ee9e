//! Item entity - catalog entries referenced by characters
//!
//! Items are a tagged variant over armor, other typed gear, and freeform
//! custom entries. [`Item::modifiers`] normalizes the feature shapes so the
//! stat aggregation never needs to branch on item type to find modifiers.

use serde::{Deserialize, Serialize};

use super::Feature;
use crate::domain::value_objects::{ItemId, ModifierMap};

/// Major/severe damage boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageThresholds {
    pub major: i32,
    pub severe: i32,
}

impl DamageThresholds {
    pub fn new(major: i32, severe: i32) -> Self {
        Self { major, severe }
    }

    /// Level-derived thresholds used when no armor is worn
    pub fn for_level(level: u8) -> Self {
        let level = i32::from(level);
        Self {
            major: level,
            severe: level * 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorProfile {
    pub base_armor: i32,
    pub thresholds: DamageThresholds,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Armor(ArmorProfile),
    /// Weapons, consumables, loot and anything else with a catalog type
    Other {
        category: String,
        #[serde(default)]
        features: Vec<Feature>,
    },
    /// Freeform entry with no type tag
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default)]
    pub description: String,
    pub kind: ItemKind,
}

fn default_tier() -> u8 {
    1
}

impl Item {
    pub fn armor(name: impl Into<String>, base_armor: i32, thresholds: DamageThresholds) -> Self {
        Self::with_kind(
            name,
            ItemKind::Armor(ArmorProfile {
                base_armor,
                thresholds,
                features: Vec::new(),
            }),
        )
    }

    pub fn other(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            ItemKind::Other {
                category: category.into(),
                features: Vec::new(),
            },
        )
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::with_kind(name, ItemKind::Custom)
    }

    fn with_kind(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            tier: default_tier(),
            description: String::new(),
            kind,
        }
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    /// Append a feature. Custom items carry no features, so this is a no-op for them.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        match &mut self.kind {
            ItemKind::Armor(profile) => profile.features.push(feature),
            ItemKind::Other { features, .. } => features.push(feature),
            ItemKind::Custom => {}
        }
        self
    }

    /// Whether the item carries a catalog type tag
    pub fn is_typed(&self) -> bool {
        !matches!(self.kind, ItemKind::Custom)
    }

    pub fn as_armor(&self) -> Option<&ArmorProfile> {
        match &self.kind {
            ItemKind::Armor(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn features(&self) -> &[Feature] {
        match &self.kind {
            ItemKind::Armor(profile) => &profile.features,
            ItemKind::Other { features, .. } => features,
            ItemKind::Custom => &[],
        }
    }

    /// Every modifier map on this item's features
    pub fn modifiers(&self) -> impl Iterator<Item = &ModifierMap> {
        self.features().iter().filter_map(|f| f.modifiers.as_ref())
    }

    pub fn type_label(&self) -> &str {
        match &self.kind {
            ItemKind::Armor(_) => "armor",
            ItemKind::Other { category, .. } => category,
            ItemKind::Custom => "custom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::stat_keys;

    #[test]
    fn test_modifiers_normalize_armor_and_other_items() {
        let armor = Item::armor("Leather Armor", 3, DamageThresholds::new(6, 13))
            .with_feature(Feature::new("Flexible").with_modifier("Evasion", 1));
        let ring = Item::other("Ring of Grace", "loot")
            .with_feature(Feature::new("Graceful").with_modifier("evasion", 2))
            .with_feature(Feature::new("Plain"));

        let armor_total: i32 = armor.modifiers().map(|m| m.total(stat_keys::EVASION)).sum();
        let ring_total: i32 = ring.modifiers().map(|m| m.total(stat_keys::EVASION)).sum();
        assert_eq!(armor_total, 1);
        assert_eq!(ring_total, 2);
    }

    #[test]
    fn test_custom_items_are_untyped_and_featureless() {
        let trinket = Item::custom("Lucky coin").with_feature(Feature::new("Shiny"));
        assert!(!trinket.is_typed());
        assert_eq!(trinket.modifiers().count(), 0);
    }

    #[test]
    fn test_item_kind_serialization_is_tagged() {
        let armor = Item::armor("Chainmail", 4, DamageThresholds::new(7, 15));
        let json = serde_json::to_value(&armor).unwrap();
        assert_eq!(json["kind"]["type"], "armor");
        assert_eq!(json["kind"]["thresholds"]["severe"], 15);

        let back: Item = serde_json::from_value(json).unwrap();
        assert_eq!(back, armor);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(DamageThresholds::for_level(3), DamageThresholds::new(3, 6));
    }
}
