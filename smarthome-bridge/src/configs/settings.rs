use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Keep alive interval in seconds
    pub keep_alive: u64,
    /// Capacity of the client request channel
    pub capacity: usize,
    pub reconnect: Reconnect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconnect {
    /// Delay before the first retry, in milliseconds
    pub initial_delay: u64,
    /// Upper bound of any retry delay, in milliseconds
    pub max_delay: u64,
    /// Connection attempts allowed before the first successful session
    pub max_initial_attempts: u32,
}

impl Reconnect {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub clean_start: bool,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub broker: Broker,
    pub topic: Topic,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("BRIDGE").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.namespace.is_empty() || self.topic.namespace.contains(['/', '+', '#']) {
            return Err(ConfigError::Message(format!(
                "topic namespace must be a single non-wildcard segment, got {:?}",
                self.topic.namespace
            )));
        }

        if self.broker.username.is_some() != self.broker.password.is_some() {
            return Err(ConfigError::Message(
                "broker username and password must be set together".into(),
            ));
        }

        if self.broker.keep_alive < 5 {
            return Err(ConfigError::Message(
                "broker keep_alive must be at least 5 seconds".into(),
            ));
        }

        if self.broker.capacity == 0 {
            return Err(ConfigError::Message(
                "broker capacity must be at least 1".into(),
            ));
        }

        if self.broker.reconnect.max_initial_attempts == 0 {
            return Err(ConfigError::Message(
                "broker reconnect max_initial_attempts must be at least 1".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database max_connections must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
