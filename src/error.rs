// Typed errors with thiserror. Only the JSON/WASM boundary can fail; the engine
// core degrades silently (empty list, missing measurement, invalid index are all
// valid states, not errors).

use thiserror::Error;

/// Rail engine error types.
#[derive(Error, Debug)]
pub enum RailError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid card payload: {0}")]
    InvalidCards(String),

    #[error("Invalid signal batch: {0}")]
    InvalidSignal(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RailError {
    fn from(err: serde_json::Error) -> Self {
        RailError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RailError::InvalidConfig("missing field".to_string());
        assert!(err.to_string().contains("missing field"));
    }
}
