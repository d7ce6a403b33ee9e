//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.

use async_trait::async_trait;

use crate::domain::entities::{
    Ancestry, Campaign, Character, CharacterClass, CharacterDetails, CharacterPatch, Community,
    Item, Subclass,
};
use crate::domain::value_objects::{
    AncestryId, CampaignId, CharacterId, ClassId, CommunityId, ItemId, SubclassId,
};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid update: {0}")]
    Invalid(String),
}

impl RepoError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

// =============================================================================
// Character Data Port
// =============================================================================

/// The data access the character sheet needs.
///
/// Stat aggregation and resource tracking receive this explicitly rather than
/// reaching for a shared client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterDataPort: Send + Sync {
    /// Batch lookup of catalog items. Ids with no catalog entry are skipped.
    async fn fetch_items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepoError>;

    /// Load a character with its class, subclass, ancestry and community
    async fn fetch_character(&self, id: CharacterId) -> Result<Option<CharacterDetails>, RepoError>;

    /// Apply a partial update and return the stored result
    async fn update_character(
        &self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, RepoError>;
}

// =============================================================================
// Character Repository Port
// =============================================================================

/// Repository port for the remaining Character operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepositoryPort: Send + Sync {
    /// Create a new character
    async fn create(&self, character: &Character) -> Result<(), RepoError>;

    /// Get a character without resolving its catalog references
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;

    /// List all characters owned by a user
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Character>, RepoError>;

    /// List characters that are members of a campaign
    async fn list_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Character>, RepoError>;

    /// Replace a stored character
    async fn save(&self, character: &Character) -> Result<(), RepoError>;

    /// Attach a character to a campaign or detach it with `None`
    async fn set_campaign(
        &self,
        id: CharacterId,
        campaign_id: Option<CampaignId>,
    ) -> Result<(), RepoError>;

    /// Delete a character
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
}

// =============================================================================
// Catalog Repository Port
// =============================================================================

/// Repository port for catalog (rules content) records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepositoryPort: Send + Sync {
    async fn list_items(&self) -> Result<Vec<Item>, RepoError>;
    async fn upsert_item(&self, item: &Item) -> Result<(), RepoError>;

    async fn list_classes(&self) -> Result<Vec<CharacterClass>, RepoError>;
    async fn get_class(&self, id: ClassId) -> Result<Option<CharacterClass>, RepoError>;
    async fn upsert_class(&self, class: &CharacterClass) -> Result<(), RepoError>;

    async fn list_subclasses(&self, class_id: ClassId) -> Result<Vec<Subclass>, RepoError>;
    async fn get_subclass(&self, id: SubclassId) -> Result<Option<Subclass>, RepoError>;
    async fn upsert_subclass(&self, subclass: &Subclass) -> Result<(), RepoError>;

    async fn list_ancestries(&self) -> Result<Vec<Ancestry>, RepoError>;
    async fn get_ancestry(&self, id: AncestryId) -> Result<Option<Ancestry>, RepoError>;
    async fn upsert_ancestry(&self, ancestry: &Ancestry) -> Result<(), RepoError>;

    async fn list_communities(&self) -> Result<Vec<Community>, RepoError>;
    async fn get_community(&self, id: CommunityId) -> Result<Option<Community>, RepoError>;
    async fn upsert_community(&self, community: &Community) -> Result<(), RepoError>;
}

// =============================================================================
// Campaign Repository Port
// =============================================================================

/// Repository port for Campaign operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepositoryPort: Send + Sync {
    async fn create(&self, campaign: &Campaign) -> Result<(), RepoError>;
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;
    async fn get_by_invite_code(&self, code: &str) -> Result<Option<Campaign>, RepoError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Campaign>, RepoError>;
    async fn update(&self, campaign: &Campaign) -> Result<(), RepoError>;
    async fn delete(&self, id: CampaignId) -> Result<(), RepoError>;
}
