#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Malformed payload: expected a JSON object")]
    NotAnObject,

    #[error("Unroutable topic: {0}")]
    UnroutableTopic(String),

    #[error("Unknown message kind: {0}")]
    UnknownKind(String),
}

impl MessageError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, MessageError::MalformedPayload(_) | MessageError::NotAnObject)
    }
}
