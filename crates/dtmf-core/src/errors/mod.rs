//! Error types for dtmf-core
//!
//! This module defines the errors surfaced by the relay to its callers and
//! the errors a session layer reports back to the relay.

pub mod dtmf_errors;

// Re-export main error types
pub use dtmf_errors::{DtmfError, DtmfResult, SessionLayerError, SessionLayerResult};
