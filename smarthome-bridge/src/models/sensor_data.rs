use serde::{Deserialize, Serialize};

use super::Table;

/// One sensor sample as reported by a device. Samples are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorData {
    pub id: i64,
    pub device_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light: Option<f64>,
    /// Device-side timestamp, kept as reported
    pub timestamp: Option<String>,
}

#[derive(Clone)]
pub struct SensorDataTable;

impl Table for SensorDataTable {
    fn name(&self) -> &'static str {
        "sensor_data"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL,
                temperature REAL,
                humidity REAL,
                light REAL,
                timestamp TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_sensor_data_device ON sensor_data (device_id);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_data;")
    }
}
