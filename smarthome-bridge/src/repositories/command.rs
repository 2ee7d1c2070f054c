use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::{Error, SqliteConnection};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::Command;

pub struct CommandRepository {
    storage: Arc<Storage>,
}

impl CommandRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl CommandRepository {
    /// Insert a pending command. `params` is the serialized parameter bag.
    pub async fn create(
        &self,
        device_id: &str,
        cmd_id: Option<&str>,
        command: Option<&str>,
        params: &str,
        conn: &mut SqliteConnection,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO commands (device_id, cmd_id, command, params, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(device_id)
        .bind(cmd_id)
        .bind(command)
        .bind(params)
        .bind(OffsetDateTime::now_utc())
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Set the status of the newest command matching `(device_id, cmd_id)`.
    ///
    /// Touches at most one row and returns how many were updated; zero when
    /// nothing matches.
    pub async fn update_latest_status(
        &self,
        device_id: &str,
        cmd_id: Option<&str>,
        status: Option<&str>,
        conn: &mut SqliteConnection,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE commands SET status = $1
            WHERE id = (
                SELECT id FROM commands
                WHERE device_id = $2 AND cmd_id = $3
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            "#,
        )
        .bind(status)
        .bind(device_id)
        .bind(cmd_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_cmd_id(&self, device_id: &str, cmd_id: &str) -> Result<Vec<Command>, Error> {
        let commands: Vec<Command> = sqlx::query_as(
            r#"
            SELECT * FROM commands
            WHERE device_id = $1 AND cmd_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(device_id)
        .bind(cmd_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(commands)
    }

    pub async fn find_pending_by_device_id(&self, device_id: &str) -> Result<Vec<Command>, Error> {
        let commands: Vec<Command> = sqlx::query_as(
            "SELECT * FROM commands WHERE device_id = $1 AND status IS NULL ORDER BY id ASC",
        )
        .bind(device_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(commands)
    }
}

pub fn serialize_params(params: &Map<String, Value>) -> Result<String, serde_json::Error> {
    serde_json::to_string(params)
}
