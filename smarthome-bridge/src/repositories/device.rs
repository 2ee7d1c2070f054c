use std::sync::Arc;

use sqlx::{Error, SqliteConnection};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::Device;
use crate::services::router::DeviceInfo;

#[derive(Clone)]
pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl DeviceRepository {
    /// Insert the device or overwrite every field of the existing row.
    pub async fn upsert(
        &self,
        device_id: &str,
        info: &DeviceInfo,
        conn: &mut SqliteConnection,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO devices (device_id, ssid, ip_address, broker, firmware, last_update)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (device_id) DO UPDATE SET
                ssid = excluded.ssid,
                ip_address = excluded.ip_address,
                broker = excluded.broker,
                firmware = excluded.firmware,
                last_update = excluded.last_update
            "#,
        )
        .bind(device_id)
        .bind(&info.ssid)
        .bind(&info.ip_address)
        .bind(&info.broker)
        .bind(&info.firmware)
        .bind(OffsetDateTime::now_utc())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_device_id(&self, device_id: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices")
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(count)
    }
}
