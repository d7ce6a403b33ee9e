//! SQLite connection management and shared row helpers

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};

use crate::application::ports::outbound::RepoError;

/// Wrapper around the SQLite pool
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!("Connected to SQLite at {}", url);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist yet
    pub async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let statements = [
            r#"CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                campaign_id TEXT,
                body TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )"#,
            "CREATE INDEX IF NOT EXISTS idx_characters_owner ON characters (owner_id)",
            "CREATE INDEX IF NOT EXISTS idx_characters_campaign ON characters (campaign_id)",
            r#"CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS classes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS subclasses (
                id TEXT PRIMARY KEY,
                class_id TEXT NOT NULL,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS ancestries (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS communities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                body TEXT NOT NULL
            )"#,
            r#"CREATE TABLE IF NOT EXISTS campaigns (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                invite_code TEXT NOT NULL UNIQUE,
                body TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )"#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("SQLite schema initialized");
        Ok(())
    }
}

pub(super) fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

pub(super) fn to_body<T: Serialize>(value: &T) -> Result<String, RepoError> {
    Ok(serde_json::to_string(value)?)
}

pub(super) fn from_body<T: DeserializeOwned>(body: &str) -> Result<T, RepoError> {
    Ok(serde_json::from_str(body)?)
}

/// Run a query selecting a single `body` column and decode the first row
pub(super) async fn fetch_one_body<T: DeserializeOwned>(
    pool: &SqlitePool,
    sql: &str,
    key: String,
) -> Result<Option<T>, RepoError> {
    let row: Option<(String,)> = sqlx::query_as(sql)
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(db_err)?;
    row.map(|(body,)| from_body(&body)).transpose()
}

/// Run a query selecting a `body` column, optionally bound to one key
pub(super) async fn fetch_bodies<T: DeserializeOwned>(
    pool: &SqlitePool,
    sql: &str,
    key: Option<String>,
) -> Result<Vec<T>, RepoError> {
    let mut query = sqlx::query_as::<Sqlite, (String,)>(sql);
    if let Some(key) = key {
        query = query.bind(key);
    }
    let rows = query.fetch_all(pool).await.map_err(db_err)?;
    rows.iter().map(|(body,)| from_body(body)).collect()
}
