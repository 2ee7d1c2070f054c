use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, Sqlite, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

/// Shared handle to the bounded connection pool.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.acquire_timeout))
            .connect(&database.url)
            .await?;

        Self::create_schema(&pool, &schema_manager, &database).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Takes a connection out of the pool. It goes back when the guard drops.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, Error> {
        self.pool.acquire().await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_schema(pool: &SqlitePool, schema: &SchemaManager, database: &Database) -> Result<(), Error> {
        if database.clean_start {
            let statements = schema.dispose_schema();

            sqlx::raw_sql(&statements.join("\n")).execute(pool).await?;

            tracing::warn!("perform a clean boot: drop and recreate schema");
        }

        let statements = schema.create_schema();

        sqlx::raw_sql(&statements.join("\n")).execute(pool).await?;

        tracing::info!("database schema ready: {}", schema.table_names().join(", "));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_database(clean_start: bool) -> Database {
        Database {
            url: String::from("sqlite::memory:"),
            clean_start,
            max_connections: 1,
            acquire_timeout: 5,
        }
    }

    #[tokio::test]
    async fn test_schema_is_created() {
        let storage = Storage::new(memory_database(true), SchemaManager::default())
            .await
            .unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(storage.get_pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, vec!["commands", "device_states", "devices", "sensor_data"]);
    }

    #[tokio::test]
    async fn test_acquired_connection_returns_to_pool() {
        let storage = Storage::new(memory_database(false), SchemaManager::default())
            .await
            .unwrap();

        {
            let mut conn = storage.acquire().await.unwrap();
            sqlx::query("SELECT 1").execute(&mut *conn).await.unwrap();
        }

        // the single pooled connection must be available again
        let mut conn = storage.acquire().await.unwrap();
        sqlx::query("SELECT 1").execute(&mut *conn).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_database_fails() {
        let database = Database {
            url: String::from("sqlite:///nonexistent-dir/sub/smarthome.db"),
            clean_start: false,
            max_connections: 1,
            acquire_timeout: 1,
        };

        assert!(Storage::new(database, SchemaManager::default()).await.is_err());
    }
}
