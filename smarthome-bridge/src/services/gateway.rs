use std::sync::Arc;

use sqlx::Sqlite;
use sqlx::pool::PoolConnection;

use crate::configs::Storage;
use crate::errors::StorageError;
use crate::repositories::{
    CommandRepository, DeviceRepository, DeviceStateRepository, SensorDataRepository,
    serialize_params,
};
use crate::services::router::{
    CommandIssued, CommandResponse, DeviceInfo, RoutedMessage, SensorSample, StateSnapshot,
};

/// Kind-specific writes over the shared pool.
///
/// Every operation holds one pooled connection for its own duration only; the
/// connection goes back to the pool when the guard drops, whether the write
/// succeeded or not.
pub struct PersistenceGateway {
    storage: Arc<Storage>,
    devices: DeviceRepository,
    sensor_data: SensorDataRepository,
    device_states: DeviceStateRepository,
    commands: CommandRepository,
}

impl PersistenceGateway {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            devices: DeviceRepository::new(storage.clone()),
            sensor_data: SensorDataRepository::new(storage.clone()),
            device_states: DeviceStateRepository::new(storage.clone()),
            commands: CommandRepository::new(storage.clone()),
            storage,
        }
    }

    /// Writes a routed message, returning the number of rows affected.
    pub async fn persist(&self, message: &RoutedMessage) -> Result<u64, StorageError> {
        match message {
            RoutedMessage::Info { device_id, info } => self.upsert_device_info(device_id, info).await,
            RoutedMessage::Data { device_id, sample } => {
                self.append_sensor_sample(device_id, sample).await
            }
            RoutedMessage::State { device_id, state } => {
                self.append_state_snapshot(device_id, state).await
            }
            RoutedMessage::Command { device_id, command } => {
                self.insert_command(device_id, command).await
            }
            RoutedMessage::Response { device_id, response } => {
                self.update_command_status(device_id, response).await
            }
        }
    }

    pub async fn upsert_device_info(&self, device_id: &str, info: &DeviceInfo) -> Result<u64, StorageError> {
        let mut conn = self.acquire().await?;

        let rows = self.devices.upsert(device_id, info, &mut conn).await?;

        tracing::info!(
            device_id,
            "updated device information: ssid={:?} ip={:?} firmware={:?}",
            info.ssid,
            info.ip_address,
            info.firmware
        );

        Ok(rows)
    }

    pub async fn append_sensor_sample(&self, device_id: &str, sample: &SensorSample) -> Result<u64, StorageError> {
        let mut conn = self.acquire().await?;

        self.sensor_data.create(device_id, sample, &mut conn).await?;

        tracing::info!(
            device_id,
            "saved sensor data: temperature={:?} humidity={:?} light={:?}",
            sample.temperature,
            sample.humidity,
            sample.light
        );

        Ok(1)
    }

    pub async fn append_state_snapshot(&self, device_id: &str, state: &StateSnapshot) -> Result<u64, StorageError> {
        let mut conn = self.acquire().await?;

        self.device_states.create(device_id, state, &mut conn).await?;

        tracing::info!(
            device_id,
            "saved device state: mode={:?} fan={:?} light={:?} ac={:?}",
            state.mode,
            state.fan,
            state.light,
            state.ac
        );

        Ok(1)
    }

    pub async fn insert_command(&self, device_id: &str, command: &CommandIssued) -> Result<u64, StorageError> {
        let params = serialize_params(&command.params)?;
        let mut conn = self.acquire().await?;

        self.commands
            .create(
                device_id,
                command.cmd_id.as_deref(),
                command.command.as_deref(),
                &params,
                &mut conn,
            )
            .await?;

        tracing::info!(device_id, "saved command: {:?} ({:?})", command.command, command.cmd_id);

        Ok(1)
    }

    /// Zero affected rows means no command matched, which is not an error.
    pub async fn update_command_status(
        &self,
        device_id: &str,
        response: &CommandResponse,
    ) -> Result<u64, StorageError> {
        let mut conn = self.acquire().await?;

        let rows = self
            .commands
            .update_latest_status(
                device_id,
                response.cmd_id.as_deref(),
                response.status.as_deref(),
                &mut conn,
            )
            .await?;

        if rows == 0 {
            tracing::debug!(device_id, "no command matches response {:?}", response.cmd_id);
        } else {
            tracing::info!(
                device_id,
                "updated command response: {:?} -> {:?}",
                response.cmd_id,
                response.status
            );
        }

        Ok(rows)
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, StorageError> {
        self.storage.acquire().await.map_err(StorageError::Connect)
    }
}
