mod command;
mod device;
mod device_state;
mod sensor_data;

pub use command::{CommandRepository, serialize_params};
pub use device::DeviceRepository;
pub use device_state::DeviceStateRepository;
pub use sensor_data::SensorDataRepository;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::configs::{Database, SchemaManager, Storage};

    pub(crate) async fn setup_test_db() -> Arc<Storage> {
        Arc::new(
            Storage::new(
                Database {
                    url: String::from("sqlite::memory:"),
                    clean_start: true,
                    max_connections: 1,
                    acquire_timeout: 5,
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        )
    }
}
