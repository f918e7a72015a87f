//! Error types for tmux-gateway.

use thiserror::Error;

use crate::TmuxStatus;

/// Main error type for tmux-gateway operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The host answered with a non-OK status
    #[error("tmux request failed: {0}")]
    Protocol(TmuxStatus),

    /// The host answered OK but left out the expected payload
    #[error("tmux reported success without {expected}")]
    MalformedSuccess {
        /// What the response should have carried
        expected: &'static str,
    },

    /// Delegate resolution was attempted before a factory was registered
    #[error("no tmux delegate factory registered")]
    NoDelegateFactory,

    /// A second delegate factory registration was attempted
    #[error("a tmux delegate factory is already registered")]
    DelegateFactoryAlreadyRegistered,

    /// The registered delegate factory failed to produce a delegate
    #[error("delegate factory failed: {0}")]
    DelegateFactory(String),

    /// The transport could not complete the round trip
    #[error("Transport error: {0}")]
    Transport(String),

    /// The round trip exceeded its deadline
    #[error("Timeout waiting for response after {0}ms")]
    Timeout(u64),

    /// The delegate factory did not finish within its deadline
    #[error("Timeout resolving tmux delegate after {0}ms")]
    DelegateResolutionTimeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Symbolic status name for protocol failures.
    pub fn status_name(&self) -> Option<&'static str> {
        match self {
            Error::Protocol(status) => Some(status.name()),
            _ => None,
        }
    }

    /// Whether this is an embedder integration mistake rather than a runtime
    /// failure. Retrying will not help.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoDelegateFactory | Error::DelegateFactoryAlreadyRegistered | Error::Config(_)
        )
    }

    /// Whether the failure happened below the tmux protocol (lost connection,
    /// deadline), as opposed to a status the host chose to return.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Timeout(_) | Error::Io(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
