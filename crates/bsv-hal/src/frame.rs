//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use bsv_common::config::TelemetryConfig;

/// Request frame sent to the battery management unit.
///
/// The supervisor never looks inside; the bytes only travel to the telemetry link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame(Vec<u8>);

impl RequestFrame {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(encoded: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(encoded.trim()).map(Self)
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self, hex::FromHexError> {
        Self::from_hex(&config.request_frame)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RequestFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_in_upper_case() {
        let frame = RequestFrame::from_hex("7e3230303034363432453030323030464433370d").unwrap();
        assert_eq!(frame.as_bytes().first(), Some(&0x7E));
        assert_eq!(frame.as_bytes().last(), Some(&0x0D));
        assert_eq!(
            frame.to_string(),
            "7E3230303034363432453030323030464433370D"
        );
    }

    #[test]
    fn config_default_is_decodable() {
        let frame = RequestFrame::from_config(&TelemetryConfig::default()).unwrap();
        assert_eq!(frame.len(), 20);
    }
}
