use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceState {
    pub id: i64,
    pub device_id: String,
    pub mode: Option<String>,
    pub fan_status: Option<i64>,
    pub light_status: Option<i64>,
    pub ac_status: Option<i64>,
    /// Reporting interval in seconds
    pub interval_value: Option<i64>,
    pub timestamp: Option<String>,
}

#[derive(Clone)]
pub struct DeviceStateTable;

impl Table for DeviceStateTable {
    fn name(&self) -> &'static str {
        "device_states"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS device_states (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                mode TEXT,
                fan_status INTEGER,
                light_status INTEGER,
                ac_status INTEGER,
                interval_value INTEGER,
                timestamp TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_device_states_device ON device_states (device_id);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS device_states;")
    }
}
