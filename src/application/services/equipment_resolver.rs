//! Equipment Resolver - expands equipment entries into catalog items

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::CharacterDataPort;
use crate::domain::entities::EquippedItemEntry;
use crate::domain::services::ResolvedItem;
use crate::domain::value_objects::ItemId;

/// Resolves a character's equipment entries with one batch lookup per call
#[derive(Clone)]
pub struct EquipmentResolver {
    data: Arc<dyn CharacterDataPort>,
}

impl EquipmentResolver {
    pub fn new(data: Arc<dyn CharacterDataPort>) -> Self {
        Self { data }
    }

    /// Equipped, catalog-typed items only. These feed stat aggregation.
    #[instrument(skip(self, entries), fields(entry_count = entries.len()))]
    pub async fn resolve(&self, entries: &[EquippedItemEntry]) -> Vec<ResolvedItem> {
        self.lookup(entries.iter().filter(|e| e.equipped)).await
    }

    /// Every catalog-typed entry, equipped or not, for display
    #[instrument(skip(self, entries), fields(entry_count = entries.len()))]
    pub async fn resolve_inventory(&self, entries: &[EquippedItemEntry]) -> Vec<ResolvedItem> {
        self.lookup(entries.iter()).await
    }

    async fn lookup<'a>(
        &self,
        entries: impl Iterator<Item = &'a EquippedItemEntry>,
    ) -> Vec<ResolvedItem> {
        let entries: Vec<&EquippedItemEntry> = entries.collect();

        let mut seen = HashSet::new();
        let ids: Vec<ItemId> = entries
            .iter()
            .map(|e| e.item_id)
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.is_empty() {
            return Vec::new();
        }

        let items = match self.data.fetch_items_by_ids(&ids).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Failed to fetch equipment, continuing without items");
                return Vec::new();
            }
        };

        let mut by_id: HashMap<ItemId, _> = items.into_iter().map(|i| (i.id, i)).collect();

        entries
            .into_iter()
            .filter_map(|entry| match by_id.remove(&entry.item_id) {
                Some(item) if item.is_typed() => Some(ResolvedItem {
                    item,
                    quantity: entry.quantity,
                    equipped: entry.equipped,
                }),
                Some(_) => None,
                None => {
                    debug!(item_id = %entry.item_id, "Dropping equipment entry with no catalog item");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{MockCharacterDataPort, RepoError};
    use crate::domain::entities::{DamageThresholds, Item};

    fn entry(item_id: ItemId, equipped: bool) -> EquippedItemEntry {
        EquippedItemEntry {
            item_id,
            quantity: 1,
            equipped,
        }
    }

    #[tokio::test]
    async fn empty_entries_never_fetch() {
        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_items_by_ids().times(0);

        let resolver = EquipmentResolver::new(Arc::new(data));
        assert!(resolver.resolve(&[]).await.is_empty());
        assert!(resolver.resolve_inventory(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn only_equipped_entries_are_fetched_and_returned() {
        let armor = Item::armor("Leather", 3, DamageThresholds::new(6, 13));
        let sword = Item::other("Broadsword", "weapon");
        let armor_id = armor.id;
        let sword_id = sword.id;

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_items_by_ids()
            .withf(move |ids: &[ItemId]| ids.len() == 1 && ids[0] == armor_id)
            .times(1)
            .returning(move |_| Ok(vec![armor.clone()]));

        let resolver = EquipmentResolver::new(Arc::new(data));
        let resolved = resolver
            .resolve(&[entry(armor_id, true), entry(sword_id, false)])
            .await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].item.id, armor_id);
        assert!(resolved[0].equipped);
    }

    #[tokio::test]
    async fn unknown_and_custom_items_are_dropped() {
        let ring = Item::other("Ring", "loot");
        let coin = Item::custom("Lucky coin");
        let ring_id = ring.id;
        let coin_id = coin.id;
        let missing = ItemId::new();

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_items_by_ids()
            .times(1)
            .returning(move |_| Ok(vec![ring.clone(), coin.clone()]));

        let resolver = EquipmentResolver::new(Arc::new(data));
        let resolved = resolver
            .resolve(&[entry(missing, true), entry(ring_id, true), entry(coin_id, true)])
            .await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].item.id, ring_id);
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_empty() {
        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_items_by_ids()
            .returning(|_| Err(RepoError::Database("connection reset".to_string())));

        let resolver = EquipmentResolver::new(Arc::new(data));
        assert!(resolver.resolve(&[entry(ItemId::new(), true)]).await.is_empty());
    }

    #[tokio::test]
    async fn inventory_keeps_unequipped_entries_with_quantity() {
        let rope = Item::other("Rope", "gear");
        let rope_id = rope.id;

        let mut data = MockCharacterDataPort::new();
        data.expect_fetch_items_by_ids()
            .returning(move |_| Ok(vec![rope.clone()]));

        let resolver = EquipmentResolver::new(Arc::new(data));
        let resolved = resolver
            .resolve_inventory(&[EquippedItemEntry {
                item_id: rope_id,
                quantity: 2,
                equipped: false,
            }])
            .await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].quantity, 2);
        assert!(!resolved[0].equipped);
    }
}
