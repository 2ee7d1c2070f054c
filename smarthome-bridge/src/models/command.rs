use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Command {
    pub id: i64,
    pub device_id: String,
    pub cmd_id: Option<String>,
    pub command: Option<String>,
    /// Parameter bag serialized as JSON text
    pub params: String,
    /// `None` while the device has not answered
    pub status: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Command {
    pub fn params_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        serde_json::from_str(&self.params)
    }
}

#[derive(Clone)]
pub struct CommandTable;

impl Table for CommandTable {
    fn name(&self) -> &'static str {
        "commands"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS commands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                cmd_id TEXT,
                command TEXT,
                params TEXT NOT NULL DEFAULT '{}',
                status TEXT,
                created_at TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_commands_device_cmd ON commands (device_id, cmd_id);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS commands;")
    }
}
