//! Character repository implementation for SQLite
//!
//! The character document lives in the `body` column. `owner_id` and
//! `campaign_id` are mirrored into their own columns for the list queries.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};

use super::catalog_repository::SqliteCatalogRepository;
use super::connection::{db_err, fetch_bodies, fetch_one_body, from_body, to_body, SqliteConnection};
use crate::application::ports::outbound::{
    CatalogRepositoryPort, CharacterDataPort, CharacterRepositoryPort, RepoError,
};
use crate::domain::entities::{Character, CharacterDetails, CharacterPatch, Item};
use crate::domain::value_objects::{CampaignId, CharacterId, ItemId};

/// Repository for Character operations
#[derive(Clone)]
pub struct SqliteCharacterRepository {
    connection: SqliteConnection,
    catalog: SqliteCatalogRepository,
}

impl SqliteCharacterRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self {
            catalog: SqliteCatalogRepository::new(connection.clone()),
            connection,
        }
    }

    async fn load_for_update(
        tx: &mut Transaction<'_, Sqlite>,
        id: CharacterId,
    ) -> Result<Character, RepoError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT body FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_err)?;
        match row {
            Some((body,)) => from_body(&body),
            None => Err(RepoError::not_found("Character", id)),
        }
    }

    async fn write(
        tx: &mut Transaction<'_, Sqlite>,
        character: &Character,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE characters SET owner_id = ?, campaign_id = ?, body = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&character.owner_id)
        .bind(character.campaign_id.map(|id| id.to_string()))
        .bind(to_body(character)?)
        .bind(character.updated_at.to_rfc3339())
        .bind(character.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", character.id));
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO characters (id, owner_id, campaign_id, body, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(character.id.to_string())
        .bind(&character.owner_id)
        .bind(character.campaign_id.map(|id| id.to_string()))
        .bind(to_body(character)?)
        .bind(character.updated_at.to_rfc3339())
        .execute(self.connection.pool())
        .await
        .map_err(db_err)?;

        tracing::debug!("Created character: {}", character.name);
        Ok(())
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM characters WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Character>, RepoError> {
        fetch_bodies(
            self.connection.pool(),
            "SELECT body FROM characters WHERE owner_id = ? ORDER BY updated_at DESC",
            Some(owner_id.to_string()),
        )
        .await
    }

    async fn list_by_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Character>, RepoError> {
        fetch_bodies(
            self.connection.pool(),
            "SELECT body FROM characters WHERE campaign_id = ? ORDER BY updated_at DESC",
            Some(campaign_id.to_string()),
        )
        .await
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let mut tx = self.connection.pool().begin().await.map_err(db_err)?;
        Self::write(&mut tx, character).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn set_campaign(
        &self,
        id: CharacterId,
        campaign_id: Option<CampaignId>,
    ) -> Result<(), RepoError> {
        let mut tx = self.connection.pool().begin().await.map_err(db_err)?;
        let mut character = Self::load_for_update(&mut tx, id).await?;
        character.campaign_id = campaign_id;
        character.updated_at = Utc::now();
        Self::write(&mut tx, &character).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        tracing::debug!("Deleted character: {}", id);
        Ok(())
    }
}

#[async_trait]
impl CharacterDataPort for SqliteCharacterRepository {
    async fn fetch_items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepoError> {
        self.catalog.items_by_ids(ids).await
    }

    async fn fetch_character(&self, id: CharacterId) -> Result<Option<CharacterDetails>, RepoError> {
        let Some(character) = CharacterRepositoryPort::get(self, id).await? else {
            return Ok(None);
        };

        let class = match character.class_id {
            Some(class_id) => self.catalog.get_class(class_id).await?,
            None => None,
        };
        let subclass = match character.subclass_id {
            Some(subclass_id) => self.catalog.get_subclass(subclass_id).await?,
            None => None,
        };
        let ancestry = match character.ancestry_id {
            Some(ancestry_id) => self.catalog.get_ancestry(ancestry_id).await?,
            None => None,
        };
        let community = match character.community_id {
            Some(community_id) => self.catalog.get_community(community_id).await?,
            None => None,
        };

        Ok(Some(CharacterDetails {
            class,
            subclass,
            ancestry,
            community,
            ..CharacterDetails::bare(character)
        }))
    }

    async fn update_character(
        &self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> Result<Character, RepoError> {
        let mut tx = self.connection.pool().begin().await.map_err(db_err)?;
        let mut character = Self::load_for_update(&mut tx, id).await?;
        character
            .apply_patch(patch)
            .map_err(|e| RepoError::Invalid(e.to_string()))?;
        Self::write(&mut tx, &character).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CharacterClass, DamageThresholds, Subclass};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repository() -> SqliteCharacterRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let connection = SqliteConnection::from_pool(pool);
        connection.initialize_schema().await.unwrap();
        SqliteCharacterRepository::new(connection)
    }

    #[tokio::test]
    async fn create_get_and_list_by_owner() {
        let repo = repository().await;
        let mine = Character::new("user-1", "Marlowe");
        let theirs = Character::new("user-2", "Quill");
        repo.create(&mine).await.unwrap();
        repo.create(&theirs).await.unwrap();

        let loaded = CharacterRepositoryPort::get(&repo, mine.id).await.unwrap();
        assert_eq!(loaded, Some(mine.clone()));

        let listed = repo.list_by_owner("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(repo.list_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_delete_report_missing_rows() {
        let repo = repository().await;
        let ghost = Character::new("user-1", "Ghost");

        assert!(repo.save(&ghost).await.unwrap_err().is_not_found());
        assert!(repo.delete(ghost.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn set_campaign_updates_membership_column() {
        let repo = repository().await;
        let character = Character::new("user-1", "Marlowe");
        repo.create(&character).await.unwrap();
        let campaign_id = CampaignId::new();

        repo.set_campaign(character.id, Some(campaign_id)).await.unwrap();
        let members = repo.list_by_campaign(campaign_id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].campaign_id, Some(campaign_id));

        repo.set_campaign(character.id, None).await.unwrap();
        assert!(repo.list_by_campaign(campaign_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_character_applies_patch() {
        let repo = repository().await;
        let character = Character::new("user-1", "Marlowe");
        repo.create(&character).await.unwrap();

        let patch = CharacterPatch {
            stress: Some(3),
            background: Some("Raised by river pirates".to_string()),
            ..Default::default()
        };
        let updated = repo.update_character(character.id, patch).await.unwrap();
        assert_eq!(updated.stress.current(), 3);

        let stored = CharacterRepositoryPort::get(&repo, character.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.background, "Raised by river pirates");
        assert_eq!(stored.stress.current(), 3);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_row_untouched() {
        let repo = repository().await;
        let character = Character::new("user-1", "Marlowe");
        repo.create(&character).await.unwrap();

        let patch = CharacterPatch {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        let err = repo.update_character(character.id, patch).await.unwrap_err();
        assert!(matches!(err, RepoError::Invalid(_)));

        let stored = CharacterRepositoryPort::get(&repo, character.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Marlowe");
        assert!(repo
            .update_character(CharacterId::new(), CharacterPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn fetch_character_resolves_catalog_references() {
        let repo = repository().await;
        let class = CharacterClass::new("Guardian", 7, 9);
        let subclass = Subclass::new(class.id, "Stalwart");
        let armor = Item::armor("Chainmail", 4, DamageThresholds::new(7, 15));
        repo.catalog.upsert_class(&class).await.unwrap();
        repo.catalog.upsert_subclass(&subclass).await.unwrap();
        repo.catalog.upsert_item(&armor).await.unwrap();

        let mut character = Character::new("user-1", "Marlowe");
        character.class_id = Some(class.id);
        character.subclass_id = Some(subclass.id);
        character.ancestry_id = Some(crate::domain::value_objects::AncestryId::new());
        repo.create(&character).await.unwrap();

        let details = repo.fetch_character(character.id).await.unwrap().unwrap();
        assert_eq!(details.class, Some(class));
        assert_eq!(details.subclass, Some(subclass));
        assert!(details.ancestry.is_none());
        assert_eq!(details.ancestry_name(), "Unknown");

        let items = repo.fetch_items_by_ids(&[armor.id]).await.unwrap();
        assert_eq!(items, vec![armor]);
        assert!(repo.fetch_character(CharacterId::new()).await.unwrap().is_none());
    }
}
