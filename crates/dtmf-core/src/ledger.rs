//! Tone ledger
//!
//! Per-peer record of the tone currently held down. A peer holds at most
//! one tone: a second start before a stop is rejected, and a stop without
//! a start is a no-op. Entries live in a [`DashMap`], so start/stop on
//! different peers take different shard locks while start/stop on the same
//! peer serialize on one.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::errors::{DtmfError, DtmfResult};
use crate::session::PeerId;
use crate::tone::{CompletedTone, DtmfTone, ToneEvent};

#[derive(Debug, Default)]
pub struct ToneLedger {
    held: DashMap<PeerId, ToneEvent>,
}

impl ToneLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tone` as held by `peer` since now
    pub fn start(&self, peer: &PeerId, tone: DtmfTone) -> DtmfResult<()> {
        match self.held.entry(peer.clone()) {
            Entry::Occupied(existing) => {
                debug!(
                    "Rejecting tone {} for peer {}: {} already held",
                    tone,
                    peer,
                    existing.get().tone
                );
                Err(DtmfError::AlreadyInProgress { peer: peer.clone() })
            }
            Entry::Vacant(slot) => {
                slot.insert(ToneEvent::pressed(tone));
                Ok(())
            }
        }
    }

    /// Remove the held tone for `peer` and close its hold interval
    ///
    /// Returns `None` if nothing was held, e.g. a duplicate key release.
    pub fn stop(&self, peer: &PeerId) -> Option<CompletedTone> {
        self.held.remove(peer).map(|(_, event)| event.release())
    }

    /// Drop the held tone for `peer` without measuring it
    pub fn discard(&self, peer: &PeerId) -> Option<DtmfTone> {
        self.held.remove(peer).map(|(_, event)| event.tone)
    }

    /// Tone currently held by `peer`
    pub fn held_tone(&self, peer: &PeerId) -> Option<DtmfTone> {
        self.held.get(peer).map(|event| event.tone)
    }

    pub fn is_transmitting(&self, peer: &PeerId) -> bool {
        self.held.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn second_start_is_rejected_and_leaves_entry_unchanged() {
        let ledger = ToneLedger::new();
        let peer = PeerId::new();

        ledger.start(&peer, DtmfTone::Digit1).unwrap();
        let err = ledger.start(&peer, DtmfTone::Digit2).unwrap_err();

        assert_eq!(err, DtmfError::AlreadyInProgress { peer: peer.clone() });
        assert_eq!(ledger.held_tone(&peer), Some(DtmfTone::Digit1));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn orphan_stop_is_a_no_op() {
        let ledger = ToneLedger::new();
        assert!(ledger.stop(&PeerId::new()).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn stop_consumes_the_entry() {
        let ledger = ToneLedger::new();
        let peer = PeerId::new();

        ledger.start(&peer, DtmfTone::Star).unwrap();
        assert!(ledger.is_transmitting(&peer));
        assert_eq!(ledger.stop(&peer).map(|t| t.tone), Some(DtmfTone::Star));
        assert!(!ledger.is_transmitting(&peer));
        assert!(ledger.stop(&peer).is_none());

        // A new hold cycle may begin after the stop
        ledger.start(&peer, DtmfTone::Pound).unwrap();
    }

    #[test]
    fn peers_are_independent() {
        let ledger = ToneLedger::new();
        let alice = PeerId::new();
        let bob = PeerId::new();

        ledger.start(&alice, DtmfTone::A).unwrap();
        ledger.start(&bob, DtmfTone::B).unwrap();
        assert_eq!(ledger.stop(&alice).map(|t| t.tone), Some(DtmfTone::A));
        assert_eq!(ledger.held_tone(&bob), Some(DtmfTone::B));
    }

    #[test]
    fn discard_drops_without_measuring() {
        let ledger = ToneLedger::new();
        let peer = PeerId::new();
        ledger.start(&peer, DtmfTone::Digit9).unwrap();
        assert_eq!(ledger.discard(&peer), Some(DtmfTone::Digit9));
        assert!(ledger.stop(&peer).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_measures_the_hold_duration() {
        let ledger = ToneLedger::new();
        let peer = PeerId::new();

        ledger.start(&peer, DtmfTone::Digit5).unwrap();
        tokio::time::advance(Duration::from_millis(250)).await;
        let completed = ledger.stop(&peer).unwrap();

        assert_eq!(completed.tone, DtmfTone::Digit5);
        assert_eq!(completed.duration_ms(), 250);
    }

    #[test]
    fn racing_starts_on_one_peer_admit_exactly_one() {
        let ledger = Arc::new(ToneLedger::new());
        let peer = PeerId::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                let peer = peer.clone();
                std::thread::spawn(move || ledger.start(&peer, DtmfTone::Digit0).is_ok())
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn racing_cycles_on_one_peer_never_lose_or_duplicate() {
        let ledger = Arc::new(ToneLedger::new());
        let peer = PeerId::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = ledger.clone();
                let peer = peer.clone();
                std::thread::spawn(move || {
                    let mut started = 0usize;
                    let mut stopped = 0usize;
                    for _ in 0..500 {
                        if ledger.start(&peer, DtmfTone::Digit7).is_ok() {
                            started += 1;
                        }
                        if ledger.stop(&peer).is_some() {
                            stopped += 1;
                        }
                    }
                    (started, stopped)
                })
            })
            .collect();

        let (started, stopped) = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .fold((0, 0), |acc, (s, t)| (acc.0 + s, acc.1 + t));

        let leftover = usize::from(ledger.stop(&peer).is_some());
        assert_eq!(started, stopped + leftover);
    }
}
