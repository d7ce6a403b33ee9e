//! Catalog repository implementation for SQLite
//!
//! Catalog records are stored whole as JSON; the name column only orders
//! listings.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::connection::{
    db_err, fetch_bodies, fetch_one_body, from_body, to_body, SqliteConnection,
};
use crate::application::ports::outbound::{CatalogRepositoryPort, RepoError};
use crate::domain::entities::{Ancestry, CharacterClass, Community, Item, Subclass};
use crate::domain::value_objects::{AncestryId, ClassId, CommunityId, ItemId, SubclassId};

/// Repository for catalog (rules content) records
#[derive(Clone)]
pub struct SqliteCatalogRepository {
    connection: SqliteConnection,
}

impl SqliteCatalogRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    /// Batch lookup; ids with no row are skipped
    pub async fn items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT body FROM items WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows: Vec<(String,)> = builder
            .build_query_as()
            .fetch_all(self.connection.pool())
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|(body,)| from_body(body))
            .collect()
    }

    async fn upsert(&self, table: &str, id: String, name: &str, body: String) -> Result<(), RepoError> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (id, name, body) VALUES (?, ?, ?)",
            table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(name)
            .bind(body)
            .execute(self.connection.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogRepositoryPort for SqliteCatalogRepository {
    async fn list_items(&self) -> Result<Vec<Item>, RepoError> {
        fetch_bodies(self.connection.pool(), "SELECT body FROM items ORDER BY name", None).await
    }

    async fn upsert_item(&self, item: &Item) -> Result<(), RepoError> {
        self.upsert("items", item.id.to_string(), &item.name, to_body(item)?)
            .await
    }

    async fn list_classes(&self) -> Result<Vec<CharacterClass>, RepoError> {
        fetch_bodies(self.connection.pool(), "SELECT body FROM classes ORDER BY name", None).await
    }

    async fn get_class(&self, id: ClassId) -> Result<Option<CharacterClass>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM classes WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn upsert_class(&self, class: &CharacterClass) -> Result<(), RepoError> {
        self.upsert("classes", class.id.to_string(), &class.name, to_body(class)?)
            .await
    }

    async fn list_subclasses(&self, class_id: ClassId) -> Result<Vec<Subclass>, RepoError> {
        fetch_bodies(
            self.connection.pool(),
            "SELECT body FROM subclasses WHERE class_id = ? ORDER BY name",
            Some(class_id.to_string()),
        )
        .await
    }

    async fn get_subclass(&self, id: SubclassId) -> Result<Option<Subclass>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM subclasses WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn upsert_subclass(&self, subclass: &Subclass) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT OR REPLACE INTO subclasses (id, class_id, name, body) VALUES (?, ?, ?, ?)",
        )
        .bind(subclass.id.to_string())
        .bind(subclass.class_id.to_string())
        .bind(&subclass.name)
        .bind(to_body(subclass)?)
        .execute(self.connection.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_ancestries(&self) -> Result<Vec<Ancestry>, RepoError> {
        fetch_bodies(self.connection.pool(), "SELECT body FROM ancestries ORDER BY name", None).await
    }

    async fn get_ancestry(&self, id: AncestryId) -> Result<Option<Ancestry>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM ancestries WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn upsert_ancestry(&self, ancestry: &Ancestry) -> Result<(), RepoError> {
        self.upsert("ancestries", ancestry.id.to_string(), &ancestry.name, to_body(ancestry)?)
            .await
    }

    async fn list_communities(&self) -> Result<Vec<Community>, RepoError> {
        fetch_bodies(self.connection.pool(), "SELECT body FROM communities ORDER BY name", None).await
    }

    async fn get_community(&self, id: CommunityId) -> Result<Option<Community>, RepoError> {
        fetch_one_body(
            self.connection.pool(),
            "SELECT body FROM communities WHERE id = ?",
            id.to_string(),
        )
        .await
    }

    async fn upsert_community(&self, community: &Community) -> Result<(), RepoError> {
        self.upsert("communities", community.id.to_string(), &community.name, to_body(community)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DamageThresholds;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn repository() -> SqliteCatalogRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let connection = SqliteConnection::from_pool(pool);
        connection.initialize_schema().await.unwrap();
        SqliteCatalogRepository::new(connection)
    }

    #[tokio::test]
    async fn items_by_ids_skips_unknown_ids() {
        let repo = repository().await;
        let armor = Item::armor("Gambeson", 3, DamageThresholds::new(5, 11));
        let dagger = Item::other("Dagger", "weapon");
        repo.upsert_item(&armor).await.unwrap();
        repo.upsert_item(&dagger).await.unwrap();

        let found = repo.items_by_ids(&[armor.id, ItemId::new()]).await.unwrap();
        assert_eq!(found, vec![armor]);
        assert!(repo.items_by_ids(&[]).await.unwrap().is_empty());
        assert_eq!(repo.list_items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn subclasses_are_listed_per_class() {
        let repo = repository().await;
        let ranger = CharacterClass::new("Ranger", 6, 12);
        let bard = CharacterClass::new("Bard", 5, 10);
        repo.upsert_class(&ranger).await.unwrap();
        repo.upsert_class(&bard).await.unwrap();
        repo.upsert_subclass(&Subclass::new(ranger.id, "Wayfinder")).await.unwrap();
        repo.upsert_subclass(&Subclass::new(ranger.id, "Beastbound")).await.unwrap();
        repo.upsert_subclass(&Subclass::new(bard.id, "Troubadour")).await.unwrap();

        let names: Vec<String> = repo
            .list_subclasses(ranger.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Beastbound", "Wayfinder"]);
        assert_eq!(repo.get_class(bard.id).await.unwrap(), Some(bard));
    }

    #[tokio::test]
    async fn upsert_replaces_existing_rows() {
        let repo = repository().await;
        let mut ancestry = Ancestry::new("Drakona");
        repo.upsert_ancestry(&ancestry).await.unwrap();
        ancestry.description = "Wingless dragon kin".to_string();
        repo.upsert_ancestry(&ancestry).await.unwrap();

        let stored = repo.get_ancestry(ancestry.id).await.unwrap().unwrap();
        assert_eq!(stored.description, "Wingless dragon kin");
        assert_eq!(repo.list_ancestries().await.unwrap().len(), 1);
        assert!(repo.get_community(CommunityId::new()).await.unwrap().is_none());
    }
}
