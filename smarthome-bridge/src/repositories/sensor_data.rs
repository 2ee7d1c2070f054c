use std::sync::Arc;

use sqlx::{Error, SqliteConnection};

use crate::configs::Storage;
use crate::models::SensorData;
use crate::services::router::SensorSample;

pub struct SensorDataRepository {
    storage: Arc<Storage>,
}

impl SensorDataRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl SensorDataRepository {
    // Append a sample, duplicates included
    pub async fn create(
        &self,
        device_id: &str,
        sample: &SensorSample,
        conn: &mut SqliteConnection,
    ) -> Result<i64, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO sensor_data (device_id, temperature, humidity, light, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(device_id)
        .bind(sample.temperature)
        .bind(sample.humidity)
        .bind(sample.light)
        .bind(&sample.timestamp)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    // Samples of a device, oldest first
    pub async fn find_by_device_id(&self, device_id: &str) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> =
            sqlx::query_as("SELECT * FROM sensor_data WHERE device_id = $1 ORDER BY id ASC")
                .bind(device_id)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(records)
    }

    // Latest N samples of a device
    pub async fn find_latest_by_device_id(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE device_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }
}
