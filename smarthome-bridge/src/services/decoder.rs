use serde_json::{Map, Value};

use crate::errors::MessageError;

/// A decoded message body: a JSON object with string keys.
///
/// Accessors are lenient. A field that is missing or holds a value of an
/// unusable type reads as `None` instead of failing the whole message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(MessageError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Strings as-is, numbers and booleans rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// On/off style fields: integers, booleans or numeric strings.
    pub fn flag(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Bool(b) => Some(i64::from(*b)),
            _ => self.integer(key),
        }
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key)?.as_object()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.fields
    }
}
