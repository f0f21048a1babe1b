//! Session layer integration
//!
//! The relay does not own dialogs or transactions. It consumes them through
//! [`SessionLayer`], which a SIP stack implements on top of its dialog and
//! transaction managers:
//!
//! ```text
//! create_request ─► attach_payload ─► new_client_transaction
//!                                            │
//!                      session_state ◄───────┘ (pre-send check)
//!                            │
//!                       send_request  ·····►  response delivered later
//!                                            to registered processors
//! ```

pub mod message;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::SessionLayerResult;
use crate::processor::ResponseProcessor;

pub use message::{ClientTransaction, ContentType, Method, Request, Response, ResponseEvent};
pub use types::{PeerId, SessionState, TransactionKey};

/// Operations the relay needs from the underlying SIP session layer
///
/// Implementations must be safe to call from any task: the relay calls
/// `send_request` from the task that released a key while responses are
/// delivered to processors from the session layer's own event context.
#[async_trait]
pub trait SessionLayer: Send + Sync {
    /// Build a request scoped to the peer's existing dialog
    fn create_request(&self, peer: &PeerId, method: Method) -> SessionLayerResult<Request>;

    /// Attach a body with the given Content-Type
    ///
    /// The default implementation replaces the body and keeps
    /// Content-Length equal to its byte length.
    fn attach_payload(
        &self,
        request: &mut Request,
        content_type: &ContentType,
        body: Bytes,
    ) -> SessionLayerResult<()> {
        request.set_content(body, content_type.clone());
        Ok(())
    }

    /// Create a client transaction for the request
    fn new_client_transaction(&self, request: Request) -> SessionLayerResult<ClientTransaction>;

    /// Current dialog state of the peer, `None` if the dialog is unknown
    fn session_state(&self, peer: &PeerId) -> Option<SessionState>;

    /// Hand the transaction to the transport
    ///
    /// Returns once the request is accepted for sending, not once a
    /// response arrives.
    async fn send_request(&self, peer: &PeerId, transaction: ClientTransaction) -> SessionLayerResult<()>;

    /// Register a processor offered every response to requests of `method`
    fn register_response_processor(&self, method: Method, processor: Arc<dyn ResponseProcessor>);
}
