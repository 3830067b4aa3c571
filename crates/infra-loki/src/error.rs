//! Shipping Error Types

use thiserror::Error;

/// Why a batch did not reach Loki
///
/// These never leave the shipper: they are logged and the batch is dropped.
#[derive(Debug, Error)]
pub enum ShipError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Loki responded {status}: {body}")]
    Status { status: u16, body: String },
}
