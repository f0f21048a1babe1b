//! Transaction dispatcher
//!
//! Wraps an encoded signal in an in-dialog INFO request and hands it to the
//! session layer. The call returns as soon as the request is accepted for
//! sending; the response is handled later by the
//! [`ResponseCorrelator`](crate::correlator::ResponseCorrelator).

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::encoder::SignalMessage;
use crate::errors::{DtmfError, DtmfResult};
use crate::session::{Method, PeerId, SessionLayer, TransactionKey};

/// Result of a successful [`TransactionDispatcher::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The request was accepted for sending
    Sent(TransactionKey),
    /// The peer's dialog ended before the request went out; nothing was sent
    SessionTerminated,
}

pub struct TransactionDispatcher {
    session_layer: Arc<dyn SessionLayer>,
}

impl std::fmt::Debug for TransactionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionDispatcher")
            .field("session_layer", &"Arc<dyn SessionLayer>")
            .finish()
    }
}

impl TransactionDispatcher {
    pub fn new(session_layer: Arc<dyn SessionLayer>) -> Self {
        Self { session_layer }
    }

    /// Send `message` to `peer` in an INFO request
    ///
    /// A dialog found terminated at the pre-send check is not an error: the
    /// call was torn down while the key was held, and
    /// [`SendOutcome::SessionTerminated`] is returned without sending.
    pub async fn send(&self, peer: &PeerId, message: SignalMessage) -> DtmfResult<SendOutcome> {
        let mut request = self.session_layer.create_request(peer, Method::Info)?;

        let content_length = message.content_length();
        self.session_layer
            .attach_payload(&mut request, &message.content_type, message.body)
            .map_err(|e| {
                error!("Failed to construct the INFO request for peer {}: {}", peer, e);
                DtmfError::from(e)
            })?;
        request.set_content_length(content_length);

        let transaction = self.session_layer.new_client_transaction(request).map_err(|e| {
            error!("Failed to create a client transaction for the INFO request: {}", e);
            DtmfError::from(e)
        })?;

        match self.session_layer.session_state(peer) {
            Some(state) if !state.is_terminated() => {}
            _ => {
                info!("Dropping DTMF INFO for peer {}: dialog already terminated", peer);
                return Ok(SendOutcome::SessionTerminated);
            }
        }

        let key = transaction.key.clone();
        self.session_layer.send_request(peer, transaction).await.map_err(|e| {
            error!("Failed to send the INFO request to peer {}: {}", peer, e);
            DtmfError::from(e)
        })?;
        debug!("Sent DTMF INFO to peer {} (transaction {})", peer, key);

        Ok(SendOutcome::Sent(key))
    }
}
