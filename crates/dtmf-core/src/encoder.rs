//! Signal encoder
//!
//! Builds the `application/dtmf-relay` body carried by an INFO request:
//!
//! ```text
//! Signal=5
//! Duration=250
//! ```
//!
//! The duration is always present, including zero for a tap released in
//! the same millisecond it was pressed.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::session::ContentType;
use crate::tone::{CompletedTone, DtmfTone};

/// Top-level media type of relay payloads
pub const DTMF_RELAY_CONTENT_TYPE: &str = "application";

/// Media subtype of relay payloads
pub const DTMF_RELAY_CONTENT_SUBTYPE: &str = "dtmf-relay";

/// Line terminator used inside the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\r\n`, as SIP bodies are normally framed
    #[default]
    CrLf,
    /// `\n`
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Encoded payload ready to attach to an INFO request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMessage {
    pub content_type: ContentType,
    pub body: Bytes,
}

impl SignalMessage {
    /// Exact byte length of the body, as required for Content-Length
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// The Content-Type every relay payload carries
pub fn dtmf_relay_content_type() -> ContentType {
    ContentType::new(DTMF_RELAY_CONTENT_TYPE, DTMF_RELAY_CONTENT_SUBTYPE)
}

/// Encode a tone and its hold duration in whole milliseconds
pub fn encode(tone: DtmfTone, duration_ms: u64, line_ending: LineEnding) -> SignalMessage {
    let eol = line_ending.as_str();
    let content = format!("Signal={}{eol}Duration={}{eol}", tone.to_char(), duration_ms);

    SignalMessage {
        content_type: dtmf_relay_content_type(),
        body: Bytes::from(content),
    }
}

/// Encode a completed hold
pub fn encode_completed(completed: &CompletedTone, line_ending: LineEnding) -> SignalMessage {
    encode(completed.tone, completed.duration_ms(), line_ending)
}
