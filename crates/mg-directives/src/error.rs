//! Directive error types.

/// Error raised when registering a directive.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Name does not match `[A-Za-z_][A-Za-z0-9_-]*`.
    #[error("invalid directive name '{0}'")]
    InvalidName(String),
    /// `end` closes blocks and cannot be a directive.
    #[error("'end' is reserved for closing block directives")]
    ReservedName,
}

/// Error returned by a directive handler.
///
/// The engine never propagates it: the matched text is left unchanged and
/// the error is reported as a diagnostic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HandlerError {
    /// Arguments did not have the shape the handler expects.
    #[error("malformed arguments: {0}")]
    MalformedArguments(String),
    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Create a malformed-arguments error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedArguments(message.into())
    }

    /// Create a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
