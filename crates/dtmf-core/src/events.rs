//! Relay events
//!
//! Published on a broadcast channel so applications can observe tone
//! delivery without touching the relay's state. Publishing never fails an
//! operation: with no subscribers the event is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::session::{PeerId, TransactionKey};
use crate::tone::DtmfTone;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtmfRelayEvent {
    /// A key was pressed for a peer
    ToneStarted { peer: PeerId, tone: DtmfTone },

    /// An INFO request carrying the tone was accepted for sending
    ToneSent {
        peer: PeerId,
        tone: DtmfTone,
        duration_ms: u64,
        transaction: TransactionKey,
    },

    /// The peer's dialog ended before the tone could be sent
    ToneDropped { peer: PeerId, tone: DtmfTone },

    /// A held tone was discarded on peer release
    ToneDiscarded { peer: PeerId, tone: DtmfTone },

    /// The remote side accepted the INFO request
    ToneConfirmed { transaction: TransactionKey, status_code: u16 },

    /// The remote side rejected the INFO request
    ToneRejected { transaction: TransactionKey, status_code: u16 },
}

/// Sender half shared by the relay components
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: broadcast::Sender<DtmfRelayEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DtmfRelayEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: DtmfRelayEvent) {
        if self.tx.send(event).is_err() {
            trace!("No subscribers for DTMF relay event");
        }
    }
}
