use thiserror::Error;

/// Failure reported by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum MixpanelError {
    /// A required field is missing or inconsistent. Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid date '{0}', expected yyyy-mm-dd")]
    InvalidDate(String),

    /// The payload could not be JSON-encoded. The request was not sent.
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A batch was aborted after some chunks were already delivered.
    ///
    /// Events in chunks `chunk_index..` were not sent.
    #[error(
        "batch aborted at chunk {chunk_index} after {chunks_sent} chunk(s) ({events_sent} events) were sent: {source}"
    )]
    PartialBatchFailure {
        chunk_index: usize,
        chunks_sent: usize,
        events_sent: usize,
        #[source]
        source: Box<MixpanelError>,
    },
}

pub type Result<T> = std::result::Result<T, MixpanelError>;
