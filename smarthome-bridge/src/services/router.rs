use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::configs::Topic;
use crate::errors::MessageError;
use crate::services::decoder::Payload;

/// The closed set of message kinds published under a device topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Info,
    Data,
    State,
    Command,
    Response,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Data => "data",
            MessageKind::State => "state",
            MessageKind::Command => "command",
            MessageKind::Response => "response",
        }
    }
}

impl FromStr for MessageKind {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(MessageKind::Info),
            "data" => Ok(MessageKind::Data),
            "state" => Ok(MessageKind::State),
            "command" => Ok(MessageKind::Command),
            "response" => Ok(MessageKind::Response),
            other => Err(MessageError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub device_id: String,
    pub kind: MessageKind,
}

/// Splits `<namespace>/<device_id>/<kind>[/...]` topics.
#[derive(Debug, Clone)]
pub struct TopicRouter {
    namespace: String,
}

impl TopicRouter {
    pub fn new(topic: &Topic) -> Self {
        Self {
            namespace: topic.namespace.clone(),
        }
    }

    /// Wildcard filter covering every topic under the namespace.
    pub fn subscription(&self) -> String {
        format!("{}/#", self.namespace)
    }

    pub fn route(&self, topic: &str) -> Result<Route, MessageError> {
        let segments: Vec<&str> = topic.split('/').collect();

        if segments.len() < 3 {
            return Err(MessageError::UnroutableTopic(topic.to_string()));
        }

        if segments[0] != self.namespace || segments[1].is_empty() {
            return Err(MessageError::UnroutableTopic(topic.to_string()));
        }

        Ok(Route {
            device_id: segments[1].to_string(),
            kind: segments[2].parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub ssid: Option<String>,
    pub ip_address: Option<String>,
    pub broker: Option<String>,
    pub firmware: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light: Option<f64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub mode: Option<String>,
    pub fan: Option<i64>,
    pub light: Option<i64>,
    pub ac: Option<i64>,
    pub interval: Option<i64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandIssued {
    pub cmd_id: Option<String>,
    pub command: Option<String>,
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    pub cmd_id: Option<String>,
    pub status: Option<String>,
}

/// A decoded message bound to its device, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedMessage {
    Info { device_id: String, info: DeviceInfo },
    Data { device_id: String, sample: SensorSample },
    State { device_id: String, state: StateSnapshot },
    Command { device_id: String, command: CommandIssued },
    Response { device_id: String, response: CommandResponse },
}

impl RoutedMessage {
    pub fn new(route: Route, payload: &Payload) -> Self {
        let Route { device_id, kind } = route;

        match kind {
            MessageKind::Info => RoutedMessage::Info {
                device_id,
                info: DeviceInfo {
                    ssid: payload.text("ssid"),
                    ip_address: payload.text("ip"),
                    broker: payload.text("broker"),
                    firmware: payload.text("firmware"),
                },
            },
            MessageKind::Data => RoutedMessage::Data {
                device_id,
                sample: SensorSample {
                    temperature: payload.number("temperature"),
                    humidity: payload.number("humidity"),
                    light: payload.number("light"),
                    timestamp: payload.text("timestamp"),
                },
            },
            MessageKind::State => RoutedMessage::State {
                device_id,
                state: StateSnapshot {
                    mode: payload.text("mode"),
                    fan: payload.flag("fan"),
                    light: payload.flag("light"),
                    ac: payload.flag("ac"),
                    interval: payload.integer("interval"),
                    timestamp: payload.text("timestamp"),
                },
            },
            MessageKind::Command => RoutedMessage::Command {
                device_id,
                command: CommandIssued {
                    cmd_id: payload.text("id"),
                    command: payload.text("command"),
                    params: payload.object("params").cloned().unwrap_or_default(),
                },
            },
            MessageKind::Response => RoutedMessage::Response {
                device_id,
                response: CommandResponse {
                    cmd_id: payload.text("cmd_id"),
                    status: payload.text("status"),
                },
            },
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            RoutedMessage::Info { .. } => MessageKind::Info,
            RoutedMessage::Data { .. } => MessageKind::Data,
            RoutedMessage::State { .. } => MessageKind::State,
            RoutedMessage::Command { .. } => MessageKind::Command,
            RoutedMessage::Response { .. } => MessageKind::Response,
        }
    }

    pub fn device_id(&self) -> &str {
        match self {
            RoutedMessage::Info { device_id, .. }
            | RoutedMessage::Data { device_id, .. }
            | RoutedMessage::State { device_id, .. }
            | RoutedMessage::Command { device_id, .. }
            | RoutedMessage::Response { device_id, .. } => device_id,
        }
    }
}
