//! DTMF tone definitions
//!
//! [`DtmfTone`] is the fixed tone alphabet (`0`-`9`, `*`, `#`, `A`-`D`).
//! Symbols are validated when parsed, so everything downstream of the
//! parse only ever sees a valid tone.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// DTMF tone definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DtmfTone {
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Star,
    Pound,
    A,
    B,
    C,
    D,
}

impl DtmfTone {
    /// All sixteen tones in keypad order
    pub const ALL: [DtmfTone; 16] = [
        Self::Digit1, Self::Digit2, Self::Digit3, Self::A,
        Self::Digit4, Self::Digit5, Self::Digit6, Self::B,
        Self::Digit7, Self::Digit8, Self::Digit9, Self::C,
        Self::Star, Self::Digit0, Self::Pound, Self::D,
    ];

    /// The symbol sent in the `Signal=` line
    pub fn to_char(self) -> char {
        match self {
            Self::Digit0 => '0',
            Self::Digit1 => '1',
            Self::Digit2 => '2',
            Self::Digit3 => '3',
            Self::Digit4 => '4',
            Self::Digit5 => '5',
            Self::Digit6 => '6',
            Self::Digit7 => '7',
            Self::Digit8 => '8',
            Self::Digit9 => '9',
            Self::Star => '*',
            Self::Pound => '#',
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Digit0),
            '1' => Some(Self::Digit1),
            '2' => Some(Self::Digit2),
            '3' => Some(Self::Digit3),
            '4' => Some(Self::Digit4),
            '5' => Some(Self::Digit5),
            '6' => Some(Self::Digit6),
            '7' => Some(Self::Digit7),
            '8' => Some(Self::Digit8),
            '9' => Some(Self::Digit9),
            '*' => Some(Self::Star),
            '#' => Some(Self::Pound),
            'A' | 'a' => Some(Self::A),
            'B' | 'b' => Some(Self::B),
            'C' | 'c' => Some(Self::C),
            'D' | 'd' => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for DtmfTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Error returned when a symbol is outside the DTMF alphabet
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid DTMF symbol: {0:?}")]
pub struct InvalidToneError(pub String);

impl TryFrom<char> for DtmfTone {
    type Error = InvalidToneError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or_else(|| InvalidToneError(c.to_string()))
    }
}

impl FromStr for DtmfTone {
    type Err = InvalidToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(InvalidToneError(s.to_string())),
        }
    }
}

/// A tone that is currently held down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneEvent {
    pub tone: DtmfTone,
    pub held_since: Instant,
}

impl ToneEvent {
    /// Record a tone pressed now
    pub fn pressed(tone: DtmfTone) -> Self {
        Self { tone, held_since: Instant::now() }
    }

    /// Close the hold interval at `released_at`
    pub fn release_at(self, released_at: Instant) -> CompletedTone {
        CompletedTone {
            tone: self.tone,
            duration: released_at.saturating_duration_since(self.held_since),
        }
    }

    /// Close the hold interval now
    pub fn release(self) -> CompletedTone {
        self.release_at(Instant::now())
    }
}

/// A released tone with its closed hold interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedTone {
    pub tone: DtmfTone,
    pub duration: Duration,
}

impl CompletedTone {
    /// Hold time in whole milliseconds, saturating at `u64::MAX`
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}
