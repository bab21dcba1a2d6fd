//! Error types for LAN Lab
//!
//! None of these are fatal: every component handles its own errors locally
//! and the session can always continue.

use thiserror::Error;

use crate::identity::DeviceId;

/// Top-level error type for LAN Lab
#[derive(Debug, Error)]
pub enum LabError {
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to IPv4 addresses and masks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,

    #[error("Expected 4 octets, got {count} in {text:?}")]
    OctetCount { text: String, count: usize },

    #[error("Invalid octet {octet:?} in {text:?}")]
    InvalidOctet { text: String, octet: String },

    #[error("Octet {value} out of range in {text:?}")]
    OutOfRange { text: String, value: u32 },

    #[error("Mask {0:?} is not a contiguous prefix")]
    NonContiguousMask(String),
}

/// Errors raised by the topology store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("Device not found: {0}")]
    UnknownDevice(DeviceId),

    #[error("Cannot connect {0} to itself")]
    SelfLoop(DeviceId),
}

/// Errors related to path resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("Device not found: {0}")]
    UnknownDevice(DeviceId),

    #[error("No device has address {0}")]
    UnknownAddress(String),

    #[error("No route from {from} to {to}")]
    Unreachable { from: DeviceId, to: DeviceId },
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for LAN Lab operations
pub type LabResult<T> = Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: LabError = TopologyError::SelfLoop(DeviceId(3)).into();
        assert!(matches!(err, LabError::Topology(TopologyError::SelfLoop(_))));
        assert_eq!(err.to_string(), "Topology error: Cannot connect dev-3 to itself");
    }

    #[test]
    fn test_unreachable_message() {
        let err = RoutingError::Unreachable {
            from: DeviceId(1),
            to: DeviceId(2),
        };
        assert_eq!(err.to_string(), "No route from dev-1 to dev-2");
    }
}
