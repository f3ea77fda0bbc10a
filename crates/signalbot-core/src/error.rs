use thiserror::Error;

/// Top-level error type for signalbot.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Outbound call to the signal service failed (send, react, typing, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The inbound message stream failed or closed.
    #[error("receive error: {0}")]
    Receive(String),

    /// Attachment or link-preview download failed.
    #[error("attachment error: {0}")]
    Attachment(String),

    /// An address could not be mapped to a phone number, uuid, username, or group.
    #[error("cannot resolve receiver '{0}'")]
    UnresolvableReceiver(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Key-value storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The only failure the envelope decoder produces.
///
/// Callers treat it as "skip this payload", never as a fatal pipeline error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message format: {reason}")]
pub struct UnknownFormat {
    pub reason: String,
}

impl UnknownFormat {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
