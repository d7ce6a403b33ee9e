//! Sheet Service - assembles the character sheet view
//!
//! Loads a character with its catalog references, resolves equipment once and
//! runs the stat aggregation over it. The full sheet resolves the whole
//! inventory (aggregation skips unequipped entries); `load_stats` fetches
//! equipped items only. Values held by an open resource tracker
//! take precedence over the stored ones, since they may not be written yet.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use super::equipment_resolver::EquipmentResolver;
use super::errors::ServiceError;
use super::resource_service::ResourceService;
use crate::application::ports::outbound::CharacterDataPort;
use crate::domain::entities::CharacterDetails;
use crate::domain::services::{derive_stats, DerivedStats, ResolvedItem};
use crate::domain::value_objects::CharacterId;

#[derive(Debug, Clone)]
pub struct CharacterSheet {
    pub details: CharacterDetails,
    /// Every catalog item the character holds, equipped or not
    pub items: Vec<ResolvedItem>,
    pub stats: DerivedStats,
}

pub struct SheetService {
    data: Arc<dyn CharacterDataPort>,
    resolver: EquipmentResolver,
    resources: Arc<ResourceService>,
}

impl SheetService {
    pub fn new(data: Arc<dyn CharacterDataPort>, resources: Arc<ResourceService>) -> Self {
        Self {
            resolver: EquipmentResolver::new(data.clone()),
            data,
            resources,
        }
    }

    async fn load_details(&self, id: CharacterId) -> Result<CharacterDetails> {
        let mut details = self
            .data
            .fetch_character(id)
            .await
            .context("Failed to load character sheet")?
            .ok_or_else(|| ServiceError::character_not_found(id))?;

        if let Some(snapshot) = self.resources.snapshot(id).await {
            snapshot.overlay(&mut details.character);
        }
        Ok(details)
    }

    /// Derived defenses without the rest of the sheet
    #[instrument(skip(self))]
    pub async fn load_stats(&self, id: CharacterId) -> Result<DerivedStats> {
        let details = self.load_details(id).await?;
        let equipped = self
            .resolver
            .resolve(&details.character.equipped_items)
            .await;
        Ok(derive_stats(&details, &equipped))
    }

    #[instrument(skip(self))]
    pub async fn load_sheet(&self, id: CharacterId) -> Result<CharacterSheet> {
        let details = self.load_details(id).await?;

        // Stat aggregation ignores unequipped entries, so one lookup serves both
        let items = self
            .resolver
            .resolve_inventory(&details.character.equipped_items)
            .await;
        let stats = derive_stats(&details, &items);

        debug!(
            evasion = stats.evasion,
            armor = stats.armor,
            major = stats.thresholds.major,
            severe = stats.thresholds.severe,
            "Derived sheet stats"
        );
        Ok(CharacterSheet {
            details,
            items,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{MockCharacterDataPort, RepoError};
    use crate::application::services::debounced_writer::DebounceSettings;
    use crate::domain::entities::{
        Character, CharacterClass, DamageThresholds, Feature, Item, Subclass,
    };
    use crate::domain::value_objects::{ItemId, ResourceKind, SubclassTier};

    fn service(data: MockCharacterDataPort) -> SheetService {
        let data: Arc<dyn CharacterDataPort> = Arc::new(data);
        let resources = Arc::new(ResourceService::new(data.clone(), DebounceSettings::default()));
        SheetService::new(data, resources)
    }

    #[tokio::test]
    async fn sheet_combines_class_armor_and_features() {
        let class = CharacterClass::new("Guardian", 7, 9);
        let subclass = Subclass::new(class.id, "Stalwart").with_feature(
            SubclassTier::Foundation,
            Feature::new("Unwavering").with_modifier("major", 1),
        );
        let armor = Item::armor("Chainmail", 4, DamageThresholds::new(7, 15))
            .with_feature(Feature::new("Heavy").with_modifier("Evasion", -1));
        let cloak = Item::other("Cloak", "gear");

        let mut character = Character::new("user-1", "Marlowe");
        character.level = 2;
        character.add_item(armor.id, 1).unwrap();
        character.set_equipped(armor.id, true).unwrap();
        character.add_item(cloak.id, 1).unwrap();

        let details = CharacterDetails {
            class: Some(class),
            subclass: Some(subclass),
            ..CharacterDetails::bare(character)
        };
        let id = details.character.id;

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_character()
            .returning(move |_| Ok(Some(details.clone())));
        data.expect_fetch_items_by_ids()
            .times(1)
            .returning(move |_| Ok(vec![armor.clone(), cloak.clone()]));

        let sheet = service(data).load_sheet(id).await.unwrap();
        assert_eq!(sheet.items.len(), 2);
        assert_eq!(sheet.stats.evasion, 8);
        assert_eq!(sheet.stats.armor, 4);
        assert_eq!(sheet.stats.thresholds, DamageThresholds::new(8, 15));
    }

    #[tokio::test]
    async fn item_fetch_failure_falls_back_to_class_base() {
        let class = CharacterClass::new("Ranger", 6, 12);
        let mut character = Character::new("user-1", "Marlowe");
        character.level = 3;
        character.add_item(ItemId::new(), 1).unwrap();
        let details = CharacterDetails {
            class: Some(class),
            ..CharacterDetails::bare(character)
        };
        let id = details.character.id;

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_character()
            .returning(move |_| Ok(Some(details.clone())));
        data.expect_fetch_items_by_ids()
            .returning(|_| Err(RepoError::Database("unavailable".to_string())));

        let sheet = service(data).load_sheet(id).await.unwrap();
        assert!(sheet.items.is_empty());
        assert_eq!(sheet.stats.evasion, 12);
        assert_eq!(sheet.stats.armor, 0);
        assert_eq!(sheet.stats.thresholds, DamageThresholds::new(3, 6));
    }

    #[tokio::test(start_paused = true)]
    async fn open_tracker_values_override_stored_resources() {
        let character = Character::new("user-1", "Marlowe");
        let id = character.id;
        let details = CharacterDetails::bare(character);

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_character()
            .returning(move |_| Ok(Some(details.clone())));
        data.expect_update_character()
            .returning(|_, _| Ok(Character::new("user-1", "Marlowe")));

        let sheet_service = service(data);
        sheet_service
            .resources
            .toggle_slot("user-1", id, ResourceKind::Hope, 0, true)
            .await
            .unwrap();

        let sheet = sheet_service.load_sheet(id).await.unwrap();
        assert_eq!(sheet.details.character.hope.current(), 1);
        assert_eq!(sheet.details.class_name(), "Unknown");
    }

    #[tokio::test]
    async fn stats_fetch_only_equipped_items() {
        let class = CharacterClass::new("Guardian", 7, 9);
        let armor = Item::armor("Gambeson", 3, DamageThresholds::new(5, 11));
        let spare = Item::armor("Full Plate", 8, DamageThresholds::new(8, 17));

        let mut character = Character::new("user-1", "Marlowe");
        character.add_item(armor.id, 1).unwrap();
        character.set_equipped(armor.id, true).unwrap();
        character.add_item(spare.id, 1).unwrap();
        let details = CharacterDetails {
            class: Some(class),
            ..CharacterDetails::bare(character)
        };
        let id = details.character.id;
        let armor_id = armor.id;

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_character()
            .returning(move |_| Ok(Some(details.clone())));
        data.expect_fetch_items_by_ids()
            .withf(move |ids| ids.to_vec() == vec![armor_id])
            .times(1)
            .returning(move |_| Ok(vec![armor.clone()]));

        let stats = service(data).load_stats(id).await.unwrap();
        assert_eq!(stats.armor, 3);
        assert_eq!(stats.thresholds, DamageThresholds::new(5, 11));
    }

    #[tokio::test]
    async fn missing_character_is_not_found() {
        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_character().returning(|_| Ok(None));

        let err = service(data).load_sheet(CharacterId::new()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound { .. })
        ));
    }
}
