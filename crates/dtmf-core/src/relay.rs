//! DTMF relay over SIP INFO
//!
//! [`DtmfRelay`] ties the pieces together for one session layer (typically
//! one per account):
//!
//! ```text
//! start_sending_dtmf ─► ToneLedger::start
//! stop_sending_dtmf  ─► ToneLedger::stop ─► encode ─► TransactionDispatcher::send
//!                                                          │
//! session layer ── INFO response ──► ResponseCorrelator ◄──┘ (later, elsewhere)
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tonerelay_dtmf_core::{DtmfRelay, DtmfRelayConfig, DtmfTone, PeerId, SessionLayer};
//!
//! # async fn example(session_layer: Arc<dyn SessionLayer>, peer: PeerId) -> tonerelay_dtmf_core::DtmfResult<()> {
//! let relay = DtmfRelay::new(session_layer, DtmfRelayConfig::default())?;
//!
//! relay.start_sending_dtmf(&peer, DtmfTone::Digit5)?;
//! // ... key held ...
//! relay.stop_sending_dtmf(&peer).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::DtmfRelayConfig;
use crate::correlator::ResponseCorrelator;
use crate::dispatcher::{SendOutcome, TransactionDispatcher};
use crate::encoder;
use crate::errors::DtmfResult;
use crate::events::{DtmfRelayEvent, EventPublisher};
use crate::ledger::ToneLedger;
use crate::session::{Method, PeerId, SessionLayer, TransactionKey};
use crate::tone::DtmfTone;

/// Result of [`DtmfRelay::stop_sending_dtmf`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// No tone was held for the peer
    NothingHeld,
    /// The tone was accepted for sending
    Sent {
        tone: DtmfTone,
        duration_ms: u64,
        transaction: TransactionKey,
    },
    /// The peer's dialog ended before the tone could be sent
    Dropped { tone: DtmfTone },
}

/// Discards a held tone if the owning future is dropped mid-hold
struct HeldToneGuard<'a> {
    ledger: &'a ToneLedger,
    peer: &'a PeerId,
    armed: bool,
}

impl<'a> HeldToneGuard<'a> {
    fn new(ledger: &'a ToneLedger, peer: &'a PeerId) -> Self {
        Self { ledger, peer, armed: true }
    }

    /// Hand the hold back to the normal stop path
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for HeldToneGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Some(tone) = self.ledger.discard(self.peer) {
                debug!("Discarded DTMF tone {} for peer {}: sequence cancelled", tone, self.peer);
            }
        }
    }
}

#[derive(Debug)]
pub struct DtmfRelay {
    config: DtmfRelayConfig,
    // The registered correlator stands down once this is dropped
    _alive: Arc<()>,
    ledger: ToneLedger,
    dispatcher: TransactionDispatcher,
    events: EventPublisher,
}

impl DtmfRelay {
    /// Create a relay and register its correlator for INFO responses
    pub fn new(session_layer: Arc<dyn SessionLayer>, config: DtmfRelayConfig) -> DtmfResult<Self> {
        config.validate()?;

        let events = EventPublisher::new(config.event_channel_capacity);
        let alive = Arc::new(());
        let correlator = Arc::new(ResponseCorrelator::new(events.clone(), Arc::downgrade(&alive)));
        session_layer.register_response_processor(Method::Info, correlator);
        info!("DTMF relay registered for INFO responses");

        Ok(Self {
            config,
            _alive: alive,
            ledger: ToneLedger::new(),
            dispatcher: TransactionDispatcher::new(session_layer),
            events,
        })
    }

    /// Begin holding `tone` for `peer`
    ///
    /// Fails with [`DtmfError::AlreadyInProgress`](crate::DtmfError::AlreadyInProgress)
    /// if the peer already holds a tone.
    pub fn start_sending_dtmf(&self, peer: &PeerId, tone: DtmfTone) -> DtmfResult<()> {
        self.ledger.start(peer, tone)?;
        debug!("Started DTMF tone {} for peer {}", tone, peer);
        self.events.publish(DtmfRelayEvent::ToneStarted { peer: peer.clone(), tone });
        Ok(())
    }

    /// Release the held tone for `peer` and send it with its hold duration
    ///
    /// A release without a matching press returns [`StopOutcome::NothingHeld`].
    pub async fn stop_sending_dtmf(&self, peer: &PeerId) -> DtmfResult<StopOutcome> {
        let Some(completed) = self.ledger.stop(peer) else {
            debug!("No DTMF tone held for peer {}", peer);
            return Ok(StopOutcome::NothingHeld);
        };

        let duration_ms = completed.duration_ms();
        let message = encoder::encode_completed(&completed, self.config.line_ending);

        match self.dispatcher.send(peer, message).await? {
            SendOutcome::Sent(transaction) => {
                self.events.publish(DtmfRelayEvent::ToneSent {
                    peer: peer.clone(),
                    tone: completed.tone,
                    duration_ms,
                    transaction: transaction.clone(),
                });
                Ok(StopOutcome::Sent {
                    tone: completed.tone,
                    duration_ms,
                    transaction,
                })
            }
            SendOutcome::SessionTerminated => {
                self.events.publish(DtmfRelayEvent::ToneDropped {
                    peer: peer.clone(),
                    tone: completed.tone,
                });
                Ok(StopOutcome::Dropped { tone: completed.tone })
            }
        }
    }

    /// Press and release each tone of `digits` using the configured timing
    ///
    /// Characters outside the DTMF alphabet are skipped. Returns the number
    /// of tones sent; stops at the first error.
    pub async fn send_dtmf_sequence(&self, peer: &PeerId, digits: &str) -> DtmfResult<usize> {
        let mut sent = 0;
        let mut first = true;

        for c in digits.chars() {
            let Some(tone) = DtmfTone::from_char(c) else {
                warn!("Skipping invalid DTMF symbol {:?} for peer {}", c, peer);
                continue;
            };

            if !first && self.config.inter_digit_delay_ms > 0 {
                tokio::time::sleep(self.config.inter_digit_delay()).await;
            }
            first = false;

            self.start_sending_dtmf(peer, tone)?;
            let hold = HeldToneGuard::new(&self.ledger, peer);
            tokio::time::sleep(self.config.tone_duration()).await;
            hold.disarm();
            if let StopOutcome::Sent { .. } = self.stop_sending_dtmf(peer).await? {
                sent += 1;
            }
        }

        Ok(sent)
    }

    /// Discard any tone held for `peer` without sending it
    pub fn release_peer(&self, peer: &PeerId) -> Option<DtmfTone> {
        let tone = self.ledger.discard(peer)?;
        debug!("Discarded held DTMF tone {} for peer {}", tone, peer);
        self.events.publish(DtmfRelayEvent::ToneDiscarded { peer: peer.clone(), tone });
        Some(tone)
    }

    /// Subscribe to relay events
    pub fn subscribe(&self) -> broadcast::Receiver<DtmfRelayEvent> {
        self.events.subscribe()
    }

    pub fn ledger(&self) -> &ToneLedger {
        &self.ledger
    }

    pub fn config(&self) -> &DtmfRelayConfig {
        &self.config
    }
}
