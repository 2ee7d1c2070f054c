use std::sync::Arc;

use smarthome_bridge::configs::{Broker, Database, Reconnect, SchemaManager, Storage, Topic};
use smarthome_bridge::repositories::{
    CommandRepository, DeviceRepository, DeviceStateRepository, SensorDataRepository,
};
use smarthome_bridge::services::{Dispatcher, TopicRouter};

pub struct MockBridge {
    pub storage: Arc<Storage>,
    pub dispatcher: Dispatcher,
}

impl MockBridge {
    pub async fn new() -> Self {
        let storage = Arc::new(
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
        );

        let router = TopicRouter::new(&Topic {
            namespace: String::from("SmartHome"),
        });

        Self {
            dispatcher: Dispatcher::new(router, storage.clone()),
            storage,
        }
    }

    pub fn devices(&self) -> DeviceRepository {
        DeviceRepository::new(self.storage.clone())
    }

    pub fn sensor_data(&self) -> SensorDataRepository {
        SensorDataRepository::new(self.storage.clone())
    }

    pub fn device_states(&self) -> DeviceStateRepository {
        DeviceStateRepository::new(self.storage.clone())
    }

    pub fn commands(&self) -> CommandRepository {
        CommandRepository::new(self.storage.clone())
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.storage.get_pool())
            .await
            .unwrap();

        count
    }

    pub async fn total_rows(&self) -> i64 {
        let mut total = 0;
        for table in ["devices", "sensor_data", "device_states", "commands"] {
            total += self.row_count(table).await;
        }

        total
    }
}

pub fn broker_settings(port: u16) -> Broker {
    Broker {
        host: String::from("127.0.0.1"),
        port,
        client_id: String::from("bridge-test"),
        username: None,
        password: None,
        keep_alive: 60,
        capacity: 10,
        reconnect: Reconnect {
            initial_delay: 10,
            max_delay: 50,
            max_initial_attempts: 3,
        },
    }
}
