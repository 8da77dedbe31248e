//! Completion error types.

use std::time::Duration;

/// Error from a completion call.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The service is disabled.
    #[error("AI service is disabled")]
    Disabled,

    /// The call did not finish in time.
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The endpoint answered with an error status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request could not be sent or the response not read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response did not contain a completion.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The blocking request task panicked or was cancelled.
    #[error("request task failed: {0}")]
    Task(String),
}

impl From<ureq::Error> for AiError {
    fn from(e: ureq::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
