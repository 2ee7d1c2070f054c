use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MqttAuth {
    BasicAuth { username: String, password: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broker {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub auth: Option<MqttAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    pub namespace: String,
    pub devices: Vec<String>,
    pub data_interval: u64,
    pub state_interval: u64,
    /// Issue a `get_status` command to every device this often; unset disables it
    pub command_interval: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub broker: Broker,
    pub mock: Mock,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::from_toml(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/mock.toml"
        )))
    }

    pub fn from_toml(source: &str) -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(source)?;

        if settings.mock.devices.is_empty() {
            return Err("mock needs at least one device".into());
        }

        if settings.mock.data_interval == 0
            || settings.mock.state_interval == 0
            || settings.mock.command_interval == Some(0)
        {
            return Err("mock intervals must be at least one second".into());
        }

        Ok(settings)
    }
}
