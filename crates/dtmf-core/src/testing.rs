//! In-memory session layer for tests
//!
//! [`MockSessionLayer`] keeps dialog states in a map, records every request
//! accepted for sending, and lets tests inject failures at each step of the
//! send path. Responses are delivered through a real
//! [`ResponseProcessorChain`], the same way a SIP stack would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;

use crate::errors::{SessionLayerError, SessionLayerResult};
use crate::processor::{ResponseProcessor, ResponseProcessorChain};
use crate::session::{
    ClientTransaction, ContentType, Method, PeerId, Request, Response, ResponseEvent, SessionLayer,
    SessionState, TransactionKey,
};

/// A request the mock accepted for sending
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub peer: PeerId,
    pub transaction: ClientTransaction,
}

impl SentRequest {
    pub fn request(&self) -> Option<&Request> {
        self.transaction.request()
    }

    pub fn body_str(&self) -> Option<&str> {
        self.request().and_then(Request::body_str)
    }
}

#[derive(Debug, Default)]
pub struct MockSessionLayer {
    sessions: DashMap<PeerId, SessionState>,
    cseq: AtomicU32,
    processors: ResponseProcessorChain,
    sent: Mutex<Vec<SentRequest>>,
    fail_encoding: AtomicBool,
    fail_transaction: AtomicBool,
    fail_transport: AtomicBool,
    terminate_after_transaction: DashSet<PeerId>,
}

impl MockSessionLayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a peer with a confirmed dialog
    pub fn add_peer(&self) -> PeerId {
        let peer = PeerId::new();
        self.sessions.insert(peer.clone(), SessionState::Confirmed);
        peer
    }

    pub fn set_state(&self, peer: &PeerId, state: SessionState) {
        self.sessions.insert(peer.clone(), state);
    }

    pub fn remove_peer(&self, peer: &PeerId) {
        self.sessions.remove(peer);
    }

    /// Terminate the peer's dialog right after its next transaction is created
    pub fn terminate_after_transaction(&self, peer: &PeerId) {
        self.terminate_after_transaction.insert(peer.clone());
    }

    pub fn fail_encoding(&self, fail: bool) {
        self.fail_encoding.store(fail, Ordering::SeqCst);
    }

    pub fn fail_transaction_creation(&self, fail: bool) {
        self.fail_transaction.store(fail, Ordering::SeqCst);
    }

    pub fn fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    pub fn sent_requests(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn processors(&self) -> &ResponseProcessorChain {
        &self.processors
    }

    /// Deliver a response to a previously sent transaction
    pub fn deliver_response(&self, transaction: &ClientTransaction, status_code: u16, reason: &str) -> bool {
        let event = ResponseEvent::new(Response::new(status_code, reason), transaction.clone());
        let method = transaction
            .request()
            .map(|r| r.method.clone())
            .unwrap_or(Method::Info);
        self.deliver_event(&method, &event)
    }

    /// Offer an arbitrary event to the processors registered for `method`
    pub fn deliver_event(&self, method: &Method, event: &ResponseEvent) -> bool {
        self.processors.dispatch(method, event)
    }
}

#[async_trait]
impl SessionLayer for MockSessionLayer {
    fn create_request(&self, peer: &PeerId, method: Method) -> SessionLayerResult<Request> {
        if !self.sessions.contains_key(peer) {
            return Err(SessionLayerError::SessionNotFound { peer: peer.clone() });
        }
        let cseq = self.cseq.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Request::new(method, peer.clone(), cseq))
    }

    fn attach_payload(
        &self,
        request: &mut Request,
        content_type: &ContentType,
        body: Bytes,
    ) -> SessionLayerResult<()> {
        if self.fail_encoding.load(Ordering::SeqCst) {
            return Err(SessionLayerError::Encoding(format!("cannot encode {} body", content_type)));
        }
        request.set_content(body, content_type.clone());
        Ok(())
    }

    fn new_client_transaction(&self, request: Request) -> SessionLayerResult<ClientTransaction> {
        if self.fail_transaction.load(Ordering::SeqCst) {
            return Err(SessionLayerError::TransactionUnavailable("transaction table full".into()));
        }
        if self.terminate_after_transaction.remove(&request.peer).is_some() {
            self.sessions.insert(request.peer.clone(), SessionState::Terminated);
        }
        Ok(ClientTransaction::new(TransactionKey::generate(), request))
    }

    fn session_state(&self, peer: &PeerId) -> Option<SessionState> {
        self.sessions.get(peer).map(|state| *state)
    }

    async fn send_request(&self, peer: &PeerId, transaction: ClientTransaction) -> SessionLayerResult<()> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(SessionLayerError::Transport("network unreachable".into()));
        }
        self.sent.lock().push(SentRequest {
            peer: peer.clone(),
            transaction,
        });
        Ok(())
    }

    fn register_response_processor(&self, method: Method, processor: Arc<dyn ResponseProcessor>) {
        self.processors.register(method, processor);
    }
}
