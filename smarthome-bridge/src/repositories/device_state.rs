use std::sync::Arc;

use sqlx::{Error, SqliteConnection};

use crate::configs::Storage;
use crate::models::DeviceState;
use crate::services::router::StateSnapshot;

pub struct DeviceStateRepository {
    storage: Arc<Storage>,
}

impl DeviceStateRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl DeviceStateRepository {
    pub async fn create(
        &self,
        device_id: &str,
        state: &StateSnapshot,
        conn: &mut SqliteConnection,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO device_states
                (device_id, mode, fan_status, light_status, ac_status, interval_value, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(device_id)
        .bind(&state.mode)
        .bind(state.fan)
        .bind(state.light)
        .bind(state.ac)
        .bind(state.interval)
        .bind(&state.timestamp)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn find_by_device_id(&self, device_id: &str) -> Result<Vec<DeviceState>, Error> {
        let records: Vec<DeviceState> =
            sqlx::query_as("SELECT * FROM device_states WHERE device_id = $1 ORDER BY id ASC")
                .bind(device_id)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(records)
    }

    pub async fn find_latest_by_device_id(&self, device_id: &str) -> Result<Option<DeviceState>, Error> {
        let record: Option<DeviceState> = sqlx::query_as(
            "SELECT * FROM device_states WHERE device_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(device_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(record)
    }
}
