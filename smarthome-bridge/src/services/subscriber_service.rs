use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};

use crate::configs::Broker;
use crate::errors::SessionError;
use crate::services::dispatcher::Dispatcher;
use crate::services::supervisor::{SessionState, Supervisor};

const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Owns the broker session and feeds every publish to the dispatcher, one at
/// a time, in delivery order.
pub struct SubscriberService {
    client: AsyncClient,
    event_loop: EventLoop,
    supervisor: Supervisor,
    subscription: String,
}

impl SubscriberService {
    pub fn new(broker: &Broker, subscription: String) -> Self {
        let mut options = MqttOptions::new(&broker.client_id, &broker.host, broker.port);
        options.set_keep_alive(Duration::from_secs(broker.keep_alive));

        if let (Some(username), Some(password)) = (&broker.username, &broker.password) {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, broker.capacity);

        Self {
            client,
            event_loop,
            supervisor: Supervisor::new(&broker.reconnect),
            subscription,
        }
    }

    /// Runs until `shutdown` resolves or the session fails fatally.
    ///
    /// `shutdown` is only observed between messages, so a message that is
    /// being persisted always completes first.
    pub async fn run<F>(mut self, dispatcher: &Dispatcher, shutdown: F) -> Result<(), SessionError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.supervisor.on_connecting();
        tracing::info!("connecting to broker, subscription {}", self.subscription);

        loop {
            let event = tokio::select! {
                _ = &mut shutdown => break,
                event = self.event_loop.poll() => event,
            };

            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // the event loop is polled by this task, so never wait on the request channel
                    self.client
                        .try_subscribe(self.subscription.as_str(), QoS::AtLeastOnce)?;
                    self.supervisor.on_subscribed();

                    tracing::info!("broker connection successful, subscribed to {}", self.subscription);
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    tracing::debug!("subscription acknowledged: {:?}", ack.return_codes);
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    dispatcher.dispatch(&publish.topic, &publish.payload).await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    self.supervisor.on_disconnect();
                    tracing::warn!("broker closed the session, reconnecting");
                }
                Ok(_) => {}
                Err(e) => {
                    let connected = self.supervisor.is_established();
                    let delay = self.supervisor.on_error(e).inspect_err(|e| {
                        tracing::error!("broker session failed: {}", e);
                    })?;

                    if connected {
                        tracing::warn!("connection lost, retrying in {:?}", delay);
                    } else {
                        tracing::warn!("cannot reach broker, retrying in {:?}", delay);
                    }

                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(delay) => {}
                    }

                    self.supervisor.on_connecting();
                }
            }
        }

        self.disconnect().await;

        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.supervisor.state() != SessionState::Subscribed {
            return;
        }

        if let Err(e) = self.client.try_disconnect() {
            tracing::warn!("failed to request disconnect: {}", e);
            return;
        }

        // drive the event loop until the DISCONNECT packet is on the wire
        let flushed = tokio::time::timeout(DISCONNECT_GRACE, async {
            loop {
                match self.event_loop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        if flushed.is_err() {
            tracing::warn!("disconnect was not flushed within {:?}", DISCONNECT_GRACE);
        }

        self.supervisor.on_disconnect();
        tracing::info!("disconnected from broker");
    }
}
