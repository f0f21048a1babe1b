//! Configuration for the DTMF relay
//!
//! ```rust
//! use tonerelay_dtmf_core::DtmfRelayConfig;
//! use std::time::Duration;
//!
//! let config = DtmfRelayConfig::default()
//!     .with_tone_duration(Duration::from_millis(120))
//!     .with_inter_digit_delay(Duration::from_millis(60));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.tone_duration(), Duration::from_millis(120));
//! ```
//!
//! The same settings can be loaded from TOML:
//!
//! ```rust
//! use tonerelay_dtmf_core::DtmfRelayConfig;
//!
//! let config = DtmfRelayConfig::from_toml_str(r#"
//!     default_tone_duration_ms = 160
//!     line_ending = "lf"
//! "#).unwrap();
//!
//! assert_eq!(config.default_tone_duration_ms, 160);
//! assert_eq!(config.inter_digit_delay_ms, 50);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoder::LineEnding;
use crate::errors::{DtmfError, DtmfResult};

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtmfRelayConfig {
    /// Hold time of each tone sent by `send_dtmf_sequence`
    pub default_tone_duration_ms: u64,

    /// Pause between tones of a sequence
    pub inter_digit_delay_ms: u64,

    /// Capacity of the relay event broadcast channel
    pub event_channel_capacity: usize,

    /// Line terminator inside the INFO body
    pub line_ending: LineEnding,
}

impl Default for DtmfRelayConfig {
    fn default() -> Self {
        Self {
            default_tone_duration_ms: 100,
            inter_digit_delay_ms: 50,
            event_channel_capacity: 64,
            line_ending: LineEnding::CrLf,
        }
    }
}

impl DtmfRelayConfig {
    /// Parse a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(input: &str) -> DtmfResult<Self> {
        let config: Self = toml::from_str(input)
            .map_err(|e| DtmfError::configuration(format!("Invalid DTMF relay config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_tone_duration(mut self, duration: Duration) -> Self {
        self.default_tone_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_inter_digit_delay(mut self, delay: Duration) -> Self {
        self.inter_digit_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn tone_duration(&self) -> Duration {
        Duration::from_millis(self.default_tone_duration_ms)
    }

    pub fn inter_digit_delay(&self) -> Duration {
        Duration::from_millis(self.inter_digit_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> DtmfResult<()> {
        if self.event_channel_capacity == 0 {
            return Err(DtmfError::configuration("event_channel_capacity must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DtmfRelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.line_ending, LineEnding::CrLf);
        assert_eq!(config.tone_duration(), Duration::from_millis(100));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = DtmfRelayConfig::default().with_event_channel_capacity(0);
        assert!(matches!(config.validate(), Err(DtmfError::Configuration { .. })));
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = DtmfRelayConfig::from_toml_str("inter_digit_delay_ms = 10\nline_ending = \"lf\"\n").unwrap();
        assert_eq!(config.inter_digit_delay(), Duration::from_millis(10));
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.default_tone_duration_ms, 100);
    }

    #[test]
    fn malformed_toml_is_a_configuration_error() {
        let err = DtmfRelayConfig::from_toml_str("default_tone_duration_ms = \"long\"").unwrap_err();
        assert!(matches!(err, DtmfError::Configuration { .. }));
        assert!(DtmfRelayConfig::from_toml_str("event_channel_capacity = 0").is_err());
    }

    #[test]
    fn config_serializes_to_json() {
        let json = serde_json::to_value(DtmfRelayConfig::default()).unwrap();
        assert_eq!(json["line_ending"], "crlf");
        assert_eq!(json["event_channel_capacity"], 64);
    }
}
