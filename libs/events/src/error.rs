use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EventError {
    /// Payload could not be encoded to or decoded from JSON.
    #[error("event payload encoding failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}
