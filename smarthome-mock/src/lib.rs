use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde_json::{Value, json};
use ::time::OffsetDateTime;
use tokio::time::{self, Instant};

use crate::device::{CommandRequest, CommandStatus, SimulatedDevice};
use crate::settings::{MqttAuth, Settings};
use crate::simulate::day_fraction;

mod device;
pub mod settings;
mod simulate;

const RETRY_DELAY: Duration = Duration::from_secs(2);

struct Publisher {
    client: AsyncClient,
    namespace: String,
}

impl Publisher {
    fn topic(&self, device_id: &str, kind: &str) -> String {
        format!("{}/{}/{}", self.namespace, device_id, kind)
    }

    fn publish(&self, device_id: &str, kind: &str, payload: &Value) {
        let topic = self.topic(device_id, kind);
        tracing::debug!("Send {}: {}", topic, payload);

        if let Err(e) = self
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.to_string())
        {
            tracing::warn!("failed to queue {} message for {}: {}", kind, device_id, e);
        }
    }

    fn subscribe_commands(&self, device_id: &str) {
        let topic = self.topic(device_id, "command");
        if let Err(e) = self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
            tracing::warn!("failed to subscribe to {}: {}", topic, e);
        }
    }
}

pub async fn run(settings: &Arc<Settings>) {
    let broker = &settings.broker;
    let mock = &settings.mock;

    let mut options = MqttOptions::new(&broker.client_id, &broker.host, broker.port);
    options.set_keep_alive(Duration::from_secs(30));
    if let Some(MqttAuth::BasicAuth { username, password }) = &broker.auth {
        options.set_credentials(username, password);
    }

    let (client, mut event_loop) = AsyncClient::new(options, 64);
    let publisher = Publisher {
        client,
        namespace: mock.namespace.clone(),
    };

    let mut devices: Vec<SimulatedDevice> = mock
        .devices
        .iter()
        .enumerate()
        .map(|(index, id)| {
            SimulatedDevice::new(
                id,
                index,
                Duration::from_secs(mock.data_interval),
                Duration::from_secs(mock.state_interval),
            )
        })
        .collect();

    let mut ticker = time::interval(Duration::from_secs(1));
    let mut command_ticker = time::interval(Duration::from_secs(mock.command_interval.unwrap_or(60)));
    let mut connected = false;
    let mut command_index: u32 = 0;

    loop {
        tokio::select! {
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected = true;
                    tracing::info!("connected to {}:{}, simulating {} devices", broker.host, broker.port, devices.len());

                    for device in &devices {
                        publisher.subscribe_commands(&device.id);
                        publisher.publish(&device.id, "info", &device.info_payload(&broker.host));
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    handle_command(&publisher, &mut devices, &broker.host, &publish.topic, &publish.payload);
                }
                Ok(_) => {}
                Err(e) => {
                    connected = false;
                    tracing::warn!("broker connection failed: {}, retrying in {:?}", e, RETRY_DELAY);
                    time::sleep(RETRY_DELAY).await;
                }
            },
            _ = ticker.tick(), if connected => {
                let now = Instant::now();
                let clock = OffsetDateTime::now_utc();
                let fraction = day_fraction(clock);

                for device in &mut devices {
                    if device.take_data_due(now) {
                        let data = device.data_payload(fraction, clock.unix_timestamp(), &mut rand::rng());
                        publisher.publish(&device.id, "data", &data);
                    }
                    if device.take_state_due(now) {
                        publisher.publish(&device.id, "state", &device.state_payload(clock.unix_timestamp()));
                    }
                }
            },
            _ = command_ticker.tick(), if connected && mock.command_interval.is_some() => {
                for device in &devices {
                    command_index = command_index.wrapping_add(1);
                    let id = format!("mock-{:04x}-{}", rand::rng().random::<u16>(), command_index);

                    publisher.publish(&device.id, "command", &json!({
                        "id": id,
                        "command": "get_status",
                        "params": {},
                    }));
                }
            }
        }
    }
}

fn handle_command(
    publisher: &Publisher,
    devices: &mut [SimulatedDevice],
    broker: &str,
    topic: &str,
    payload: &[u8],
) {
    let Some(device_id) = topic.split('/').nth(1) else {
        return;
    };
    let Some(device) = devices.iter_mut().find(|device| device.id == device_id) else {
        tracing::debug!("ignoring command for unknown device {}", device_id);
        return;
    };

    let request: CommandRequest = match serde_json::from_slice(payload) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("invalid command for {}: {}", device_id, e);
            return;
        }
    };

    let status = device.apply(&request);
    tracing::info!("[{}] {} on {}: {}", request.id, request.command, device.id, status.as_str());

    publisher.publish(&device.id, "response", &json!({
        "cmd_id": request.id,
        "status": status.as_str(),
    }));

    if status == CommandStatus::Done {
        if request.command == "set_interval" {
            tracing::info!("{} now reports data every {:?}", device.id, device.data_interval());
        }

        let clock = OffsetDateTime::now_utc();
        publisher.publish(&device.id, "state", &device.state_payload(clock.unix_timestamp()));

        if request.command == "get_status" {
            let data = device.data_payload(day_fraction(clock), clock.unix_timestamp(), &mut rand::rng());
            publisher.publish(&device.id, "data", &data);
            publisher.publish(&device.id, "info", &device.info_payload(broker));
        }
    }
}
