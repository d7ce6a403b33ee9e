//! Derived stat aggregation
//!
//! Pure functions that fold equipped-item and subclass-feature modifiers into
//! the values a character sheet displays. They never fail: missing inputs
//! degrade to zero or to the level-derived base.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{CharacterDetails, DamageThresholds, Item, Subclass};
use crate::domain::value_objects::{stat_keys, AdditionalData};

/// A catalog item resolved from a character's equipment entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub item: Item,
    pub quantity: u32,
    pub equipped: bool,
}

impl ResolvedItem {
    pub fn equipped(item: Item) -> Self {
        Self {
            item,
            quantity: 1,
            equipped: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseStats {
    pub evasion: i32,
    pub armor: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub evasion: i32,
    pub armor: i32,
    pub thresholds: DamageThresholds,
}

/// Effective evasion and armor score.
///
/// Evasion starts at the class base (0 without a class) and gains every
/// `evasion` modifier on equipped items. Armor is the sum of equipped armor
/// base values.
pub fn aggregate_defenses(base_evasion: Option<i32>, items: &[ResolvedItem]) -> DefenseStats {
    let mut stats = DefenseStats {
        evasion: base_evasion.unwrap_or(0),
        armor: 0,
    };

    for resolved in items.iter().filter(|r| r.equipped) {
        if let Some(armor) = resolved.item.as_armor() {
            stats.armor += armor.base_armor;
        }
        stats.evasion += resolved
            .item
            .modifiers()
            .map(|m| m.total(stat_keys::EVASION))
            .sum::<i32>();
    }

    stats
}

/// Major and severe damage thresholds.
///
/// The first equipped armor replaces the level-derived base; active subclass
/// features then add their `major` / `severe` modifiers on top.
pub fn calculate_thresholds(
    level: u8,
    items: &[ResolvedItem],
    subclass: Option<&Subclass>,
    additional_data: &AdditionalData,
) -> DamageThresholds {
    let mut thresholds = items
        .iter()
        .filter(|r| r.equipped)
        .find_map(|r| r.item.as_armor())
        .map(|armor| armor.thresholds)
        .unwrap_or_else(|| DamageThresholds::for_level(level));

    if let Some(subclass) = subclass {
        for feature in subclass.active_features(additional_data) {
            thresholds.major += feature.modifier_total(stat_keys::MAJOR);
            thresholds.severe += feature.modifier_total(stat_keys::SEVERE);
        }
    }

    thresholds
}

/// Everything the sheet derives for a character and its resolved equipment
pub fn derive_stats(details: &CharacterDetails, items: &[ResolvedItem]) -> DerivedStats {
    let defenses = aggregate_defenses(details.base_evasion(), items);
    let thresholds = calculate_thresholds(
        details.character.level,
        items,
        details.subclass.as_ref(),
        &details.character.additional_data,
    );

    DerivedStats {
        evasion: defenses.evasion,
        armor: defenses.armor,
        thresholds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Character, CharacterClass, Feature};
    use crate::domain::value_objects::SubclassTier;

    fn leather(base: i32) -> Item {
        Item::armor("Leather Armor", base, DamageThresholds::new(6, 13))
    }

    fn unequipped(item: Item) -> ResolvedItem {
        ResolvedItem {
            item,
            quantity: 1,
            equipped: false,
        }
    }

    #[test]
    fn test_class_base_with_evasion_armor() {
        let armor = Item::armor("Gambeson", 3, DamageThresholds::new(5, 11))
            .with_feature(Feature::new("Flexible").with_modifier("evasion", 1));

        let stats = aggregate_defenses(Some(10), &[ResolvedItem::equipped(armor)]);
        assert_eq!(stats, DefenseStats { evasion: 11, armor: 3 });
    }

    #[test]
    fn test_missing_class_defaults_to_zero() {
        assert_eq!(aggregate_defenses(None, &[]), DefenseStats::default());
    }

    #[test]
    fn test_more_armor_never_lowers_total() {
        let mut items = vec![ResolvedItem::equipped(leather(3))];
        let before = aggregate_defenses(Some(9), &items).armor;
        items.push(ResolvedItem::equipped(leather(2)));
        let after = aggregate_defenses(Some(9), &items).armor;
        assert!(after >= before);
        assert_eq!(after, 5);
    }

    #[test]
    fn test_evasion_is_order_independent() {
        let ring = Item::other("Ring", "loot")
            .with_feature(Feature::new("Quick").with_modifier("Evasion", 2));
        let cloak = Item::other("Cloak", "loot")
            .with_feature(Feature::new("Heavy").with_modifier("EVASION", -1))
            .with_feature(Feature::new("Warm").with_modifier("agility", 1));
        let armor = Item::armor("Plate", 6, DamageThresholds::new(9, 19))
            .with_feature(Feature::new("Cumbersome").with_modifier("evasion", -2));

        let forward = vec![
            ResolvedItem::equipped(ring.clone()),
            ResolvedItem::equipped(cloak.clone()),
            ResolvedItem::equipped(armor.clone()),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();

        let a = aggregate_defenses(Some(10), &forward);
        let b = aggregate_defenses(Some(10), &reversed);
        assert_eq!(a, b);
        assert_eq!(a.evasion, 10 + 2 - 1 - 2);
    }

    #[test]
    fn test_unequipped_items_contribute_nothing() {
        let armor = leather(4).with_feature(Feature::new("Light").with_modifier("evasion", 1));
        let items = vec![unequipped(armor)];

        assert_eq!(aggregate_defenses(Some(10), &items), DefenseStats { evasion: 10, armor: 0 });
        assert_eq!(
            calculate_thresholds(2, &items, None, &AdditionalData::default()),
            DamageThresholds::for_level(2)
        );
    }

    #[test]
    fn test_thresholds_without_armor_use_level() {
        let class = CharacterClass::new("Seraph", 7, 9);
        let subclass = Subclass::new(class.id, "Winged Sentinel")
            .with_feature(SubclassTier::Foundation, Feature::new("Wings of Light"));

        let thresholds = calculate_thresholds(3, &[], Some(&subclass), &AdditionalData::default());
        assert_eq!(thresholds, DamageThresholds::new(3, 6));
    }

    #[test]
    fn test_armor_overrides_then_unlocked_mastery_adds() {
        let class = CharacterClass::new("Guardian", 7, 9);
        let subclass = Subclass::new(class.id, "Stalwart").with_feature(
            SubclassTier::Mastery,
            Feature::new("Undaunted").with_modifier("severe", 1),
        );
        let armor = Item::armor("Gambeson", 3, DamageThresholds::new(5, 11));
        let items = vec![ResolvedItem::equipped(armor)];

        let mut data = AdditionalData::default();
        let locked = calculate_thresholds(3, &items, Some(&subclass), &data);
        assert_eq!(locked, DamageThresholds::new(5, 11));

        data.unlock(SubclassTier::Mastery);
        let unlocked = calculate_thresholds(3, &items, Some(&subclass), &data);
        assert_eq!(unlocked, DamageThresholds::new(5, 12));
    }

    #[test]
    fn test_feature_modifiers_add_to_level_base() {
        let class = CharacterClass::new("Guardian", 7, 9);
        let subclass = Subclass::new(class.id, "Stalwart")
            .with_feature(
                SubclassTier::Foundation,
                Feature::new("Unwavering").with_modifier("Major", 1).with_modifier("severe", 1),
            )
            .with_feature(
                SubclassTier::Specialization,
                Feature::new("Unrelenting").with_modifier("major", 2).with_modifier("severe", 2),
            );

        let mut data = AdditionalData::default();
        data.unlock(SubclassTier::Specialization);

        let thresholds = calculate_thresholds(1, &[], Some(&subclass), &data);
        assert_eq!(thresholds, DamageThresholds::new(1 + 1 + 2, 2 + 1 + 2));
    }

    #[test]
    fn test_derive_stats_combines_everything() {
        let class = CharacterClass::new("Warrior", 6, 11);
        let mut character = Character::new("user-1", "Brakka");
        character.level = 2;
        let details = CharacterDetails {
            class: Some(class),
            ..CharacterDetails::bare(character)
        };

        let stats = derive_stats(&details, &[ResolvedItem::equipped(leather(3))]);
        assert_eq!(stats.evasion, 11);
        assert_eq!(stats.armor, 3);
        assert_eq!(stats.thresholds, DamageThresholds::new(6, 13));
    }
}
