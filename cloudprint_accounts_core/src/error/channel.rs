//! Cloud-print channel error types

use thiserror::Error;

/// Failures reported by a cloud-print channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The printer probe could not be answered
    #[error("Cloud print printer probe failed: {message}")]
    ProbeFailed { message: String },

    /// The channel has been shut down
    #[error("Cloud print channel is disconnected")]
    Disconnected,
}

impl ChannelError {
    /// Create a probe failure error
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
        }
    }
}
