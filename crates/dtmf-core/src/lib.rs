//! # DTMF relay over SIP INFO
//!
//! Sends DTMF tones to the remote party of an established dialog as
//! `application/dtmf-relay` INFO requests, for endpoints that cannot or
//! should not carry tones in the media path.
//!
//! ## Components
//!
//! - [`ToneLedger`]: which tone each peer currently holds, and since when
//! - [`encoder`]: `Signal=`/`Duration=` body for a released tone
//! - [`TransactionDispatcher`]: INFO request in the peer's dialog, handed
//!   to the session layer without waiting for the response
//! - [`ResponseCorrelator`]: recognises responses to relay INFOs by the
//!   Content-Type of the original request and logs the outcome
//! - [`DtmfRelay`]: the entry point combining the above
//!
//! The SIP stack itself is abstracted behind [`SessionLayer`]; the relay
//! never creates dialogs, retransmits, or times out requests.
//!
//! ## Concurrency
//!
//! Key presses and releases arrive from call-control tasks while responses
//! arrive from the session layer's event context. The ledger is the only
//! shared mutable state and locks per shard, so peers do not contend with
//! each other and a single peer's start/stop are serialized.

pub mod config;
pub mod correlator;
pub mod dispatcher;
pub mod encoder;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod processor;
pub mod relay;
pub mod session;
pub mod tone;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::DtmfRelayConfig;
pub use correlator::{CorrelationOutcome, ResponseCorrelator};
pub use dispatcher::{SendOutcome, TransactionDispatcher};
pub use encoder::{LineEnding, SignalMessage};
pub use errors::{DtmfError, DtmfResult, SessionLayerError, SessionLayerResult};
pub use events::DtmfRelayEvent;
pub use ledger::ToneLedger;
pub use processor::{ResponseProcessor, ResponseProcessorChain};
pub use relay::{DtmfRelay, StopOutcome};
pub use session::{
    ClientTransaction, ContentType, Method, PeerId, Request, Response, ResponseEvent, SessionLayer,
    SessionState, TransactionKey,
};
pub use tone::{CompletedTone, DtmfTone, InvalidToneError, ToneEvent};
