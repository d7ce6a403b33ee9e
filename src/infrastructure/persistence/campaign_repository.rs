//! Campaign repository implementation for SQLite

use async_trait::async_trait;

use super::connection::{db_err, fetch_bodies, fetch_one_body, to_body, SqliteConnection};
use crate::application::ports::outbound::{CampaignRepositoryPort, RepoError};
use crate::domain::entities::Campaign;
use crate::domain::value_objects::CampaignId;

/// Repository for Campaign operations
#[derive(Clone)]
pub struct SqliteCampaignRepository {
    connection: SqliteConnection,
}

impl SqliteCampaignRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CampaignRepositoryPort for SqliteCampaignRepository {
    async fn create(&self, campaign: &Campaign) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO campaigns (id, owner_id, invite_code, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.owner_id)
        .bind(&campaign.invite_code)
        .bind(to_body(campaign)?)
        .bind(campaign.created_at.to_rfc3339())
        .execute(self.connection.pool())
        .await
        .map_err(db_err)?;

        tracing::debug!("Created campaign: {}", campaign.name);
        Ok(())
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM campaigns WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn get_by_invite_code(&self, code: &str) -> Result<Option<Campaign>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM campaigns WHERE invite_code = ?",
            code.to_string(),
        )
        .await
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Campaign>, RepoError> {
        fetch_bodies(
            self.connection.pool(),
            "SELECT body FROM campaigns WHERE owner_id = ? ORDER BY created_at DESC",
            Some(owner_id.to_string()),
        )
        .await
    }

    async fn update(&self, campaign: &Campaign) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE campaigns SET invite_code = ?, body = ? WHERE id = ?")
            .bind(&campaign.invite_code)
            .bind(to_body(campaign)?)
            .bind(campaign.id.to_string())
            .execute(self.connection.pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Campaign", campaign.id));
        }
        Ok(())
    }

    async fn delete(&self, id: CampaignId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(self.connection.pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Campaign", id));
        }
        tracing::debug!("Deleted campaign: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::CharacterId;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repository() -> SqliteCampaignRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let connection = SqliteConnection::from_pool(pool);
        connection.initialize_schema().await.unwrap();
        SqliteCampaignRepository::new(connection)
    }

    #[tokio::test]
    async fn lookup_by_invite_code() {
        let repo = repository().await;
        let campaign = Campaign::new("gm-1", "The Witherwild");
        repo.create(&campaign).await.unwrap();

        let found = repo
            .get_by_invite_code(&campaign.invite_code)
            .await
            .unwrap();
        assert_eq!(found, Some(campaign.clone()));
        assert!(repo.get_by_invite_code("NOPE0000").await.unwrap().is_none());
        assert_eq!(repo.list_by_owner("gm-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_invite_code_is_rejected() {
        let repo = repository().await;
        let first = Campaign::new("gm-1", "First");
        let mut second = Campaign::new("gm-2", "Second");
        second.invite_code = first.invite_code.clone();

        repo.create(&first).await.unwrap();
        assert!(matches!(
            repo.create(&second).await,
            Err(RepoError::Database(_))
        ));
    }

    #[tokio::test]
    async fn update_persists_members() {
        let repo = repository().await;
        let mut campaign = Campaign::new("gm-1", "The Witherwild");
        repo.create(&campaign).await.unwrap();

        let member = CharacterId::new();
        campaign.add_member(member);
        repo.update(&campaign).await.unwrap();

        let stored = repo.get(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec![member]);

        repo.delete(campaign.id).await.unwrap();
        assert!(repo.update(&campaign).await.unwrap_err().is_not_found());
        assert!(repo.delete(campaign.id).await.unwrap_err().is_not_found());
    }
}
