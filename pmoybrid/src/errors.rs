use thiserror::Error;

/// Errors raised by the control engine and its protocol drivers.
///
/// The type is `Clone` so a captured transaction outcome can be handed to
/// any number of observers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("invalid arguments for command '{command}': {reason}")]
    InvalidArguments {
        command: &'static str,
        reason: String,
    },
    #[error("command '{0}' is not supported by driver '{1}'")]
    UnsupportedCommand(&'static str, &'static str),
    #[error("cannot derive stream URI from '{0}': {1}")]
    StreamUri(String, String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("session is not connected")]
    NotConnected,
    #[error("transaction was already executed")]
    TransactionAlreadyRun,
    #[error("audio completion signalled before control completion")]
    AudioBeforeControl,
    #[error("transaction execution failed: {0}")]
    TransactionFailed(#[source] Box<ControlError>),
}

impl ControlError {
    pub fn invalid_arguments(command: &'static str, reason: impl Into<String>) -> Self {
        ControlError::InvalidArguments {
            command,
            reason: reason.into(),
        }
    }

    pub fn stream_uri(base: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ControlError::StreamUri(base.into(), cause.to_string())
    }

    pub fn http(message: impl Into<String>) -> Self {
        ControlError::Http(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        ControlError::Protocol(message.into())
    }
}
