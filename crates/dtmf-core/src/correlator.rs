//! Response correlator
//!
//! Registered for every INFO response the session layer receives, not just
//! the ones the relay sent. A response belongs to the relay when the
//! original request in its client transaction carries an
//! `application/dtmf-relay` body; anything else is left for the next
//! processor in the chain.
//!
//! Outcomes are only logged and published. By the time a response arrives
//! the tone has left the ledger and the send call has returned, so there is
//! nothing to update and nobody to return an error to.

use std::sync::Weak;

use tracing::{debug, error, info, trace};

use crate::encoder::{DTMF_RELAY_CONTENT_SUBTYPE, DTMF_RELAY_CONTENT_TYPE};
use crate::events::{DtmfRelayEvent, EventPublisher};
use crate::processor::ResponseProcessor;
use crate::session::ResponseEvent;

/// Classification of one inbound response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationOutcome {
    /// 2xx to a relay INFO
    Confirmed(u16),
    /// 1xx to a relay INFO
    Provisional(u16),
    /// 3xx-6xx to a relay INFO
    Rejected(u16),
    /// Not a response to a relay INFO, or unreadable
    Unrecognized,
}

impl CorrelationOutcome {
    /// Classify an inbound response
    pub fn classify(event: &ResponseEvent) -> Self {
        let Some(response) = event.response.as_ref() else {
            trace!("Ignoring response event without a response");
            return Self::Unrecognized;
        };
        let Some(transaction) = event.client_transaction.as_ref() else {
            trace!("Ignoring {} response without a client transaction", response.status_code);
            return Self::Unrecognized;
        };
        let Some(request) = transaction.request() else {
            trace!("Ignoring response for transaction {} without its request", transaction.key);
            return Self::Unrecognized;
        };

        let is_relay = request
            .content_type()
            .is_some_and(|ct| ct.matches(DTMF_RELAY_CONTENT_TYPE, DTMF_RELAY_CONTENT_SUBTYPE));
        if !is_relay {
            return Self::Unrecognized;
        }

        let status = response.status_code;
        if response.is_success() {
            Self::Confirmed(status)
        } else if response.is_provisional() {
            Self::Provisional(status)
        } else {
            Self::Rejected(status)
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// Response processor registered by a [`DtmfRelay`](crate::DtmfRelay)
///
/// Holds only a weak handle on its relay. Once the relay is dropped the
/// correlator claims nothing, so a relay rebuilt on the same session layer
/// receives its own responses.
#[derive(Debug, Clone)]
pub struct ResponseCorrelator {
    events: EventPublisher,
    owner: Weak<()>,
}

impl ResponseCorrelator {
    pub fn new(events: EventPublisher, owner: Weak<()>) -> Self {
        Self { events, owner }
    }
}

impl ResponseProcessor for ResponseCorrelator {
    fn process_response(&self, event: &ResponseEvent) -> bool {
        if !self.is_active() {
            return false;
        }

        let outcome = CorrelationOutcome::classify(event);

        // Any handled outcome implies a client transaction is present
        let Some(transaction) = event.client_transaction.as_ref().map(|t| t.key.clone()) else {
            return outcome.is_handled();
        };

        match outcome {
            CorrelationOutcome::Confirmed(status_code) => {
                info!("DTMF send succeeded: {} (transaction {})", status_code, transaction);
                self.events.publish(DtmfRelayEvent::ToneConfirmed { transaction, status_code });
            }
            CorrelationOutcome::Provisional(status_code) => {
                debug!("DTMF send in progress: {} (transaction {})", status_code, transaction);
            }
            CorrelationOutcome::Rejected(status_code) => {
                error!("DTMF send failed: {} (transaction {})", status_code, transaction);
                self.events.publish(DtmfRelayEvent::ToneRejected { transaction, status_code });
            }
            CorrelationOutcome::Unrecognized => {}
        }

        outcome.is_handled()
    }

    fn is_active(&self) -> bool {
        self.owner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bytes::Bytes;

    use crate::encoder::{LineEnding, encode};
    use crate::session::{ClientTransaction, ContentType, Method, PeerId, Request, Response, TransactionKey};
    use crate::tone::DtmfTone;

    fn relay_transaction() -> ClientTransaction {
        let message = encode(DtmfTone::Digit1, 100, LineEnding::CrLf);
        let mut request = Request::new(Method::Info, PeerId::new(), 7);
        request.set_content(message.body, message.content_type);
        ClientTransaction::new(TransactionKey::generate(), request)
    }

    fn foreign_transaction() -> ClientTransaction {
        let mut request = Request::new(Method::Info, PeerId::new(), 8);
        request.set_content(Bytes::from_static(b"<xml/>"), ContentType::new("application", "media_control+xml"));
        ClientTransaction::new(TransactionKey::generate(), request)
    }

    #[test]
    fn classifies_by_status_category() {
        let tx = relay_transaction();
        let classify = |code| CorrelationOutcome::classify(&ResponseEvent::new(Response::new(code, ""), tx.clone()));

        assert_eq!(classify(200), CorrelationOutcome::Confirmed(200));
        assert_eq!(classify(202), CorrelationOutcome::Confirmed(202));
        assert_eq!(classify(100), CorrelationOutcome::Provisional(100));
        assert_eq!(classify(415), CorrelationOutcome::Rejected(415));
        assert_eq!(classify(503), CorrelationOutcome::Rejected(503));
    }

    #[test]
    fn foreign_content_type_is_unrecognized() {
        let event = ResponseEvent::new(Response::new(200, "OK"), foreign_transaction());
        assert_eq!(CorrelationOutcome::classify(&event), CorrelationOutcome::Unrecognized);
    }

    #[test]
    fn request_without_body_is_unrecognized() {
        let request = Request::new(Method::Info, PeerId::new(), 1);
        let event = ResponseEvent::new(Response::new(200, "OK"), ClientTransaction::new(TransactionKey::generate(), request));
        assert_eq!(CorrelationOutcome::classify(&event), CorrelationOutcome::Unrecognized);
    }

    #[test]
    fn incomplete_events_are_unrecognized() {
        assert_eq!(CorrelationOutcome::classify(&ResponseEvent::default()), CorrelationOutcome::Unrecognized);

        let no_tx = ResponseEvent { response: Some(Response::new(200, "OK")), client_transaction: None };
        assert_eq!(CorrelationOutcome::classify(&no_tx), CorrelationOutcome::Unrecognized);

        let no_request = ResponseEvent::new(
            Response::new(200, "OK"),
            ClientTransaction::without_request(TransactionKey::generate()),
        );
        assert_eq!(CorrelationOutcome::classify(&no_request), CorrelationOutcome::Unrecognized);

        let no_response = ResponseEvent { response: None, client_transaction: Some(relay_transaction()) };
        assert_eq!(CorrelationOutcome::classify(&no_response), CorrelationOutcome::Unrecognized);
    }

    #[test]
    fn content_type_match_ignores_case() {
        let mut request = Request::new(Method::Info, PeerId::new(), 3);
        request.set_content(Bytes::from_static(b"Signal=1\r\nDuration=1\r\n"), ContentType::new("Application", "DTMF-Relay"));
        let event = ResponseEvent::new(Response::new(200, "OK"), ClientTransaction::new(TransactionKey::generate(), request));
        assert_eq!(CorrelationOutcome::classify(&event), CorrelationOutcome::Confirmed(200));
    }

    #[tokio::test]
    async fn processor_claims_and_publishes_relay_responses() {
        let events = EventPublisher::new(8);
        let mut rx = events.subscribe();
        let owner = Arc::new(());
        let correlator = ResponseCorrelator::new(events, Arc::downgrade(&owner));
        let tx = relay_transaction();

        assert!(correlator.process_response(&ResponseEvent::new(Response::new(200, "OK"), tx.clone())));
        assert_eq!(
            rx.recv().await.unwrap(),
            DtmfRelayEvent::ToneConfirmed { transaction: tx.key.clone(), status_code: 200 }
        );

        assert!(correlator.process_response(&ResponseEvent::new(Response::new(481, "Gone"), tx.clone())));
        assert_eq!(
            rx.recv().await.unwrap(),
            DtmfRelayEvent::ToneRejected { transaction: tx.key.clone(), status_code: 481 }
        );

        assert!(correlator.process_response(&ResponseEvent::new(Response::new(100, "Trying"), tx)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn processor_passes_on_foreign_responses() {
        let owner = Arc::new(());
        let correlator = ResponseCorrelator::new(EventPublisher::new(8), Arc::downgrade(&owner));
        let event = ResponseEvent::new(Response::new(200, "OK"), foreign_transaction());
        assert!(!correlator.process_response(&event));
        assert!(!correlator.process_response(&ResponseEvent::default()));
    }

    #[test]
    fn orphaned_correlator_passes_relay_responses_on() {
        let owner = Arc::new(());
        let correlator = ResponseCorrelator::new(EventPublisher::new(8), Arc::downgrade(&owner));
        let event = ResponseEvent::new(Response::new(200, "OK"), relay_transaction());

        assert!(correlator.process_response(&event));
        drop(owner);
        assert!(!correlator.is_active());
        assert!(!correlator.process_response(&event));
    }
}
