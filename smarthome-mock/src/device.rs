use std::time::Duration;

use rand::Rng;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::time::Instant;

use crate::simulate::{simulated_humidity, simulated_light, simulated_temperature};

const MIN_INTERVAL: i64 = 5;
const MAX_INTERVAL: i64 = 3600;

/// Payload published on `<namespace>/<device>/command`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Done,
    Error,
}

impl CommandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Done => "done",
            CommandStatus::Error => "error",
        }
    }
}

/// In-memory stand-in for one ESP board.
#[derive(Debug)]
pub struct SimulatedDevice {
    pub id: String,
    address: String,
    mode: i64,
    fan: i64,
    light: i64,
    ac: i64,
    data_interval: Duration,
    state_interval: Duration,
    last_data: Option<Instant>,
    last_state: Option<Instant>,
}

impl SimulatedDevice {
    pub fn new(id: &str, index: usize, data_interval: Duration, state_interval: Duration) -> Self {
        Self {
            id: id.to_string(),
            address: format!("192.168.1.{}", 100 + index % 100),
            mode: 0,
            fan: 0,
            light: 0,
            ac: 0,
            data_interval,
            state_interval,
            last_data: None,
            last_state: None,
        }
    }

    pub fn data_interval(&self) -> Duration {
        self.data_interval
    }

    /// Marks the data as sent when it is due.
    pub fn take_data_due(&mut self, now: Instant) -> bool {
        take_due(&mut self.last_data, self.data_interval, now)
    }

    pub fn take_state_due(&mut self, now: Instant) -> bool {
        take_due(&mut self.last_state, self.state_interval, now)
    }

    pub fn info_payload(&self, broker: &str) -> Value {
        json!({
            "ssid": "SmartHome-Mock",
            "ip": self.address,
            "broker": broker,
            "firmware": concat!("mock-", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn data_payload<R: Rng>(&self, day_fraction: f64, timestamp: i64, rng: &mut R) -> Value {
        let temperature = simulated_temperature(day_fraction) + rng.random_range(-0.5..0.5);
        let humidity = simulated_humidity(day_fraction) + rng.random_range(-2.0..2.0);
        let light = simulated_light(day_fraction) * rng.random_range(0.95..1.05);

        json!({
            "temperature": (temperature * 10.0).round() / 10.0,
            "humidity": humidity.round().clamp(0.0, 100.0),
            "light": light.round() as i64,
            "timestamp": timestamp,
        })
    }

    pub fn state_payload(&self, timestamp: i64) -> Value {
        json!({
            "timestamp": timestamp,
            "mode": self.mode,
            "interval": self.data_interval.as_secs(),
            "fan": self.fan,
            "light": self.light,
            "ac": self.ac,
        })
    }

    pub fn apply(&mut self, request: &CommandRequest) -> CommandStatus {
        let params = &request.params;

        let applied = match request.command.as_str() {
            "set_mode" => param(params, "mode")
                .filter(|mode| *mode >= 0)
                .map(|mode| self.mode = mode)
                .is_some(),
            "set_device" => {
                let device = params.get("device").and_then(Value::as_str);
                match (device, param(params, "state")) {
                    (Some(device), Some(state)) => self.switch(device, state),
                    _ => false,
                }
            }
            "set_devices" => {
                let mut any = false;
                for device in ["fan", "light", "ac"] {
                    if let Some(state) = param(params, device) {
                        any |= self.switch(device, state);
                    }
                }
                any
            }
            "set_interval" => param(params, "interval")
                .filter(|interval| (MIN_INTERVAL..=MAX_INTERVAL).contains(interval))
                .map(|interval| {
                    self.data_interval = Duration::from_secs(interval as u64);
                    self.last_data = None;
                })
                .is_some(),
            "factory_reset" => {
                self.mode = 0;
                self.fan = 0;
                self.light = 0;
                self.ac = 0;
                true
            }
            "get_status" | "reboot" => true,
            _ => false,
        };

        if applied {
            CommandStatus::Done
        } else {
            CommandStatus::Error
        }
    }

    fn switch(&mut self, device: &str, state: i64) -> bool {
        let target = match device {
            "fan" => &mut self.fan,
            "light" => &mut self.light,
            "ac" => &mut self.ac,
            _ => return false,
        };
        *target = i64::from(state != 0);
        true
    }
}

fn take_due(last: &mut Option<Instant>, interval: Duration, now: Instant) -> bool {
    let due = last.is_none_or(|at| now.duration_since(at) >= interval);
    if due {
        *last = Some(now);
    }
    due
}

fn param(params: &Map<String, Value>, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
