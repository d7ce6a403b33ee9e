//! Character Service - Application service for character management
//!
//! This service provides use case implementations for creating, updating and
//! deleting player characters and for managing their equipment and inventory.
//! Every mutation checks that the caller owns the character.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::errors::ServiceError;
use crate::application::ports::outbound::{
    CampaignRepositoryPort, CharacterDataPort, CharacterRepositoryPort,
};
use crate::domain::entities::{
    Character, CharacterError, CharacterPatch, InventoryEntry, MAX_BACKGROUND_LENGTH,
};
use crate::domain::value_objects::{CharacterId, ItemId};

/// Request to create a new character outside the builder
#[derive(Debug, Clone)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub pronouns: Option<String>,
    pub background: Option<String>,
}

/// Character service trait defining the application use cases
#[async_trait]
pub trait CharacterService: Send + Sync {
    /// Create a new, incomplete character with default resources
    async fn create_character(&self, owner_id: &str, request: CreateCharacterRequest)
        -> Result<Character>;

    /// Get a character by ID
    async fn get_character(&self, id: CharacterId) -> Result<Character>;

    /// List all characters owned by a user
    async fn list_characters(&self, owner_id: &str) -> Result<Vec<Character>>;

    /// Apply a partial update
    async fn update_character(
        &self,
        owner_id: &str,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character>;

    /// Delete a character, detaching it from its campaign
    async fn delete_character(&self, owner_id: &str, id: CharacterId) -> Result<()>;

    /// Add a catalog item; the same item again aggregates quantity
    async fn add_item(
        &self,
        owner_id: &str,
        id: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<Character>;

    /// Equip or unequip a held item
    async fn set_equipped(
        &self,
        owner_id: &str,
        id: CharacterId,
        item_id: ItemId,
        equipped: bool,
    ) -> Result<Character>;

    /// Drop a held item entirely
    async fn remove_item(&self, owner_id: &str, id: CharacterId, item_id: ItemId)
        -> Result<Character>;

    async fn add_inventory_entry(
        &self,
        owner_id: &str,
        id: CharacterId,
        entry: InventoryEntry,
    ) -> Result<Character>;

    async fn remove_inventory_entry(
        &self,
        owner_id: &str,
        id: CharacterId,
        index: usize,
    ) -> Result<Character>;

    /// Advance one level (at most 10)
    async fn level_up(&self, owner_id: &str, id: CharacterId) -> Result<Character>;
}

/// Default implementation of CharacterService backed by the repository ports
pub struct CharacterServiceImpl {
    characters: Arc<dyn CharacterRepositoryPort>,
    data: Arc<dyn CharacterDataPort>,
    campaigns: Arc<dyn CampaignRepositoryPort>,
}

impl CharacterServiceImpl {
    pub fn new(
        characters: Arc<dyn CharacterRepositoryPort>,
        data: Arc<dyn CharacterDataPort>,
        campaigns: Arc<dyn CampaignRepositoryPort>,
    ) -> Self {
        Self {
            characters,
            data,
            campaigns,
        }
    }

    fn validate_create_request(request: &CreateCharacterRequest) -> Result<(), CharacterError> {
        Character::validate_name(&request.name)?;
        if let Some(ref background) = request.background {
            if background.len() > MAX_BACKGROUND_LENGTH {
                return Err(CharacterError::BackgroundTooLong);
            }
        }
        Ok(())
    }

    /// Load a character the caller owns
    async fn owned(&self, owner_id: &str, id: CharacterId) -> Result<Character> {
        let character = self
            .characters
            .get(id)
            .await
            .context("Failed to load character")?
            .ok_or_else(|| ServiceError::character_not_found(id))?;

        if character.owner_id != owner_id {
            return Err(ServiceError::not_owner("Character").into());
        }
        Ok(character)
    }

    async fn save(&self, mut character: Character) -> Result<Character> {
        character.updated_at = chrono::Utc::now();
        self.characters
            .save(&character)
            .await
            .context("Failed to save character")?;
        Ok(character)
    }
}

#[async_trait]
impl CharacterService for CharacterServiceImpl {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_character(
        &self,
        owner_id: &str,
        request: CreateCharacterRequest,
    ) -> Result<Character> {
        Self::validate_create_request(&request)?;

        let mut character = Character::new(owner_id, request.name.trim());
        character.pronouns = request.pronouns.filter(|p| !p.trim().is_empty());
        character.background = request.background.unwrap_or_default();

        self.characters
            .create(&character)
            .await
            .context("Failed to create character in repository")?;

        info!(character_id = %character.id, "Created character: {}", character.name);
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn get_character(&self, id: CharacterId) -> Result<Character> {
        debug!(character_id = %id, "Fetching character");
        Ok(self
            .characters
            .get(id)
            .await
            .context("Failed to get character from repository")?
            .ok_or_else(|| ServiceError::character_not_found(id))?)
    }

    #[instrument(skip(self))]
    async fn list_characters(&self, owner_id: &str) -> Result<Vec<Character>> {
        self.characters
            .list_by_owner(owner_id)
            .await
            .context("Failed to list characters")
    }

    #[instrument(skip(self, patch), fields(character_id = %id))]
    async fn update_character(
        &self,
        owner_id: &str,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character> {
        patch.validate()?;
        let character = self.owned(owner_id, id).await?;
        if patch.is_empty() {
            return Ok(character);
        }

        let updated = self
            .data
            .update_character(id, patch)
            .await
            .context("Failed to update character")?;

        info!(character_id = %id, "Updated character: {}", updated.name);
        Ok(updated)
    }

    #[instrument(skip(self), fields(character_id = %id))]
    async fn delete_character(&self, owner_id: &str, id: CharacterId) -> Result<()> {
        let character = self.owned(owner_id, id).await?;

        if let Some(campaign_id) = character.campaign_id {
            let campaign = self
                .campaigns
                .get(campaign_id)
                .await
                .context("Failed to load campaign of deleted character")?;
            if let Some(mut campaign) = campaign {
                if campaign.remove_member(&id) {
                    self.campaigns
                        .update(&campaign)
                        .await
                        .context("Failed to detach character from campaign")?;
                }
            }
        }

        self.characters
            .delete(id)
            .await
            .context("Failed to delete character from repository")?;

        info!(character_id = %id, "Deleted character: {}", character.name);
        Ok(())
    }

    #[instrument(skip(self), fields(character_id = %id, item_id = %item_id))]
    async fn add_item(
        &self,
        owner_id: &str,
        id: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;

        let found = self
            .data
            .fetch_items_by_ids(&[item_id])
            .await
            .context("Failed to look up catalog item")?;
        if found.is_empty() {
            return Err(ServiceError::not_found("Item", item_id).into());
        }

        character.add_item(item_id, quantity)?;
        debug!(quantity, "Added item to equipment");
        self.save(character).await
    }

    #[instrument(skip(self), fields(character_id = %id, item_id = %item_id))]
    async fn set_equipped(
        &self,
        owner_id: &str,
        id: CharacterId,
        item_id: ItemId,
        equipped: bool,
    ) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;
        character.set_equipped(item_id, equipped)?;
        self.save(character).await
    }

    #[instrument(skip(self), fields(character_id = %id, item_id = %item_id))]
    async fn remove_item(
        &self,
        owner_id: &str,
        id: CharacterId,
        item_id: ItemId,
    ) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;
        if !character.remove_item(&item_id) {
            return Err(CharacterError::ItemNotHeld(item_id).into());
        }
        self.save(character).await
    }

    #[instrument(skip(self, entry), fields(character_id = %id))]
    async fn add_inventory_entry(
        &self,
        owner_id: &str,
        id: CharacterId,
        entry: InventoryEntry,
    ) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;
        character.add_inventory_entry(entry)?;
        self.save(character).await
    }

    #[instrument(skip(self), fields(character_id = %id))]
    async fn remove_inventory_entry(
        &self,
        owner_id: &str,
        id: CharacterId,
        index: usize,
    ) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;
        let removed = character.remove_inventory_entry(index)?;
        debug!(name = %removed.name, "Removed inventory entry");
        self.save(character).await
    }

    #[instrument(skip(self), fields(character_id = %id))]
    async fn level_up(&self, owner_id: &str, id: CharacterId) -> Result<Character> {
        let mut character = self.owned(owner_id, id).await?;
        let level = character.level_up()?;
        info!(character_id = %id, level, "Character levelled up");
        self.save(character).await
    }
}
