use std::sync::Arc;

use crate::configs::Storage;
use crate::errors::{MessageError, StorageError};
use crate::services::decoder::Payload;
use crate::services::gateway::PersistenceGateway;
use crate::services::router::{MessageKind, RoutedMessage, TopicRouter};

const PREVIEW_LEN: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MalformedPayload,
    InvalidTopic,
    UnknownKind,
    ConnectionError,
    OperationError,
}

/// Terminal state of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Persisted { kind: MessageKind, rows: u64 },
    Dropped(DropReason),
}

/// Per-message pipeline: decode, route, persist, log.
///
/// Every failure is terminal for the message at hand and nothing is retried;
/// the caller moves on to the next delivery.
pub struct Dispatcher {
    router: TopicRouter,
    gateway: PersistenceGateway,
}

impl Dispatcher {
    pub fn new(router: TopicRouter, storage: Arc<Storage>) -> Self {
        Self {
            router,
            gateway: PersistenceGateway::new(storage),
        }
    }

    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> DispatchOutcome {
        tracing::debug!(topic, "received message: {}", preview(payload));

        let decoded = match Payload::decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(topic, "payload is not valid JSON, dropped: {}", e);
                return DispatchOutcome::Dropped(DropReason::MalformedPayload);
            }
        };

        let route = match self.router.route(topic) {
            Ok(route) => route,
            Err(MessageError::UnknownKind(kind)) => {
                tracing::warn!(topic, "unknown message type {:?}, dropped", kind);
                return DispatchOutcome::Dropped(DropReason::UnknownKind);
            }
            Err(e) => {
                tracing::warn!(topic, "invalid topic, dropped: {}", e);
                return DispatchOutcome::Dropped(DropReason::InvalidTopic);
            }
        };

        let message = RoutedMessage::new(route, &decoded);
        let kind = message.kind();

        match self.gateway.persist(&message).await {
            Ok(rows) => {
                tracing::debug!(device_id = message.device_id(), %kind, rows, "processing successful");
                DispatchOutcome::Persisted { kind, rows }
            }
            Err(e @ StorageError::Connect(_)) => {
                tracing::error!(device_id = message.device_id(), %kind, "cannot reach database: {}", e);
                DispatchOutcome::Dropped(DropReason::ConnectionError)
            }
            Err(e) => {
                tracing::error!(device_id = message.device_id(), %kind, "failed to store message: {}", e);
                DispatchOutcome::Dropped(DropReason::OperationError)
            }
        }
    }
}

fn preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);

    match text.char_indices().nth(PREVIEW_LEN) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.into_owned(),
    }
}
