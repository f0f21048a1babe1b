//! Identifiers and lifecycle state shared with the session layer

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one remote party in one active dialog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub Uuid);

impl PeerId {
    /// Create a new random peer identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a client transaction, derived from the Via branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionKey(pub String);

impl TransactionKey {
    /// Create a key with a fresh RFC 3261 magic-cookie branch
    pub fn generate() -> Self {
        Self(format!("z9hG4bK-{}", Uuid::new_v4().simple()))
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dialog lifecycle as seen by the relay
///
/// ```text
/// Initial → Early → Confirmed → Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Initial,
    Early,
    Confirmed,
    Terminated,
}

impl SessionState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Initial => "Initial",
            SessionState::Early => "Early",
            SessionState::Confirmed => "Confirmed",
            SessionState::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}
