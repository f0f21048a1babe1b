//! DTMF relay errors
//!
//! [`DtmfError`] follows the failure taxonomy of the relay:
//!
//! - **Caller misuse**: [`DtmfError::AlreadyInProgress`]
//! - **Transport/setup failures**: [`DtmfError::Encoding`],
//!   [`DtmfError::TransactionCreationFailed`], [`DtmfError::TransportFailure`],
//!   [`DtmfError::SessionTerminated`]
//! - **Setup**: [`DtmfError::Configuration`]
//!
//! Remote rejections and sessions that terminate while a tone is in flight
//! are not errors; they are logged and published as events instead.

use thiserror::Error;

use crate::session::PeerId;

/// Result type for relay operations
pub type DtmfResult<T> = Result<T, DtmfError>;

/// Result type for session layer operations
pub type SessionLayerResult<T> = Result<T, SessionLayerError>;

/// Errors returned to callers of the relay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DtmfError {
    /// A tone is already being held for this peer
    #[error("DTMF tone already in progress for peer {peer}")]
    AlreadyInProgress {
        /// Peer that already holds a tone
        peer: PeerId,
    },

    /// The session layer no longer knows the peer's dialog
    #[error("Session terminated for peer {peer}")]
    SessionTerminated {
        /// Peer whose dialog is gone
        peer: PeerId,
    },

    /// The payload could not be attached to the request
    #[error("Failed to encode INFO request: {message}")]
    Encoding {
        /// Error message
        message: String,
    },

    /// No client transaction could be created for the request
    #[error("Failed to create client transaction: {message}")]
    TransactionCreationFailed {
        /// Error message
        message: String,
    },

    /// The session layer refused to accept the request for sending
    #[error("Failed to send INFO request: {message}")]
    TransportFailure {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl DtmfError {
    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding { message: message.into() }
    }

    /// Create a transaction creation error
    pub fn transaction_creation_failed(message: impl Into<String>) -> Self {
        Self::TransactionCreationFailed { message: message.into() }
    }

    /// Create a transport error
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self::TransportFailure { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether this error is a logic error of the invoking layer
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::AlreadyInProgress { .. })
    }
}

/// Errors reported by a [`SessionLayer`](crate::session::SessionLayer)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionLayerError {
    /// No dialog exists for the peer
    #[error("No dialog for peer {peer}")]
    SessionNotFound {
        /// Peer without a dialog
        peer: PeerId,
    },

    /// Body could not be attached to a request
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Transaction layer refused to create a client transaction
    #[error("Transaction unavailable: {0}")]
    TransactionUnavailable(String),

    /// Request could not be handed to the transport
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<SessionLayerError> for DtmfError {
    fn from(err: SessionLayerError) -> Self {
        match err {
            SessionLayerError::SessionNotFound { peer } => DtmfError::SessionTerminated { peer },
            SessionLayerError::Encoding(message) => DtmfError::Encoding { message },
            SessionLayerError::TransactionUnavailable(message) => {
                DtmfError::TransactionCreationFailed { message }
            }
            SessionLayerError::Transport(message) => DtmfError::TransportFailure { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_layer_errors_map_onto_relay_taxonomy() {
        let peer = PeerId::new();

        assert_eq!(
            DtmfError::from(SessionLayerError::SessionNotFound { peer: peer.clone() }),
            DtmfError::SessionTerminated { peer }
        );
        assert!(matches!(
            DtmfError::from(SessionLayerError::TransactionUnavailable("busy".into())),
            DtmfError::TransactionCreationFailed { .. }
        ));
        assert!(matches!(
            DtmfError::from(SessionLayerError::Transport("down".into())),
            DtmfError::TransportFailure { .. }
        ));
        assert!(matches!(
            DtmfError::from(SessionLayerError::Encoding("bad body".into())),
            DtmfError::Encoding { .. }
        ));
    }

    #[test]
    fn only_already_in_progress_is_a_caller_error() {
        let peer = PeerId::new();
        assert!(DtmfError::AlreadyInProgress { peer }.is_caller_error());
        assert!(!DtmfError::transport_failure("x").is_caller_error());
    }

    #[test]
    fn error_messages_carry_context() {
        let err = DtmfError::transaction_creation_failed("no branch");
        assert_eq!(err.to_string(), "Failed to create client transaction: no branch");
    }
}
