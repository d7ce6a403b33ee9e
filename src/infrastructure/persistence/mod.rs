//! SQLite persistence adapters
//!
//! This module implements the repository ports on top of an sqlx SQLite pool.
//! Records are stored as JSON documents with the columns needed for lookups
//! pulled out alongside.

mod campaign_repository;
mod catalog_repository;
mod character_repository;
mod connection;
mod seed;

pub use campaign_repository::SqliteCampaignRepository;
pub use catalog_repository::SqliteCatalogRepository;
pub use character_repository::SqliteCharacterRepository;
pub use connection::SqliteConnection;
pub use seed::{seed_catalog, CatalogSeed};

use anyhow::{Context, Result};

/// Combined repository providing access to all domain repositories
#[derive(Clone)]
pub struct SqliteRepository {
    connection: SqliteConnection,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let connection = SqliteConnection::connect(database_url, 5)
            .await
            .context("Failed to open SQLite database")?;
        Self::with_connection(connection).await
    }

    pub async fn with_connection(connection: SqliteConnection) -> Result<Self> {
        connection
            .initialize_schema()
            .await
            .context("Failed to initialize schema")?;
        Ok(Self { connection })
    }

    pub fn characters(&self) -> SqliteCharacterRepository {
        SqliteCharacterRepository::new(self.connection.clone())
    }

    pub fn catalog(&self) -> SqliteCatalogRepository {
        SqliteCatalogRepository::new(self.connection.clone())
    }

    pub fn campaigns(&self) -> SqliteCampaignRepository {
        SqliteCampaignRepository::new(self.connection.clone())
    }
}
