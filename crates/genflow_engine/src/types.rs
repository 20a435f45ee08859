use std::fmt;

use thiserror::Error;

/// Remote operations the orchestrator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Generate,
    Detect,
    Humanize,
    StartVideoJob,
    PollVideoJob,
    StartLongComputation,
    PollProgress,
}

impl RemoteOp {
    pub fn name(self) -> &'static str {
        match self {
            RemoteOp::Generate => "generate",
            RemoteOp::Detect => "detect",
            RemoteOp::Humanize => "humanize",
            RemoteOp::StartVideoJob => "startVideoJob",
            RemoteOp::PollVideoJob => "pollVideoJob",
            RemoteOp::StartLongComputation => "startLongComputation",
            RemoteOp::PollProgress => "pollProgress",
        }
    }

    /// Field whose presence marks the level of the response holding the result.
    pub fn key_field(self) -> &'static str {
        match self {
            RemoteOp::Generate => "content",
            RemoteOp::Detect => "aiPercentage",
            RemoteOp::Humanize => "humanVersion",
            RemoteOp::StartVideoJob => "requestId",
            RemoteOp::PollVideoJob => "status",
            RemoteOp::StartLongComputation => "accepted",
            RemoteOp::PollProgress => "processed",
        }
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a single channel attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("response is not JSON: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportCause {
    #[error("primary channel: {primary}; fallback channel: {fallback}")]
    BothChannels {
        primary: ChannelError,
        fallback: ChannelError,
    },
    #[error("primary channel: {0}; no fallback channel configured")]
    FallbackUnavailable(ChannelError),
    /// The remote answered but reported an error of its own.
    #[error("remote error: {0}")]
    Application(String),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {cause}")]
pub struct TransportError {
    pub operation: RemoteOp,
    pub cause: TransportCause,
}

impl TransportError {
    pub fn new(operation: RemoteOp, cause: TransportCause) -> Self {
        Self { operation, cause }
    }

    /// Short, user-facing reason. The full chain goes to the log.
    pub fn summary(&self) -> String {
        match &self.cause {
            TransportCause::BothChannels { .. } | TransportCause::FallbackUnavailable(_) => {
                "the service could not be reached".to_string()
            }
            TransportCause::Application(message) => message.clone(),
            TransportCause::Malformed(_) => "the service sent an unexpected response".to_string(),
        }
    }
}
