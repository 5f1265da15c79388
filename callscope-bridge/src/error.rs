//! Bridge error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Empty model response for call {call_id}")]
    EmptyResponse { call_id: String },

    #[error("Malformed model response for call {call_id}: {source}")]
    MalformedResponse {
        call_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transcript analyzer unavailable: {0}")]
    AnalyzerUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
