//! Simulator configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [clock]
//! progress_per_tick = 5
//!
//! [session]
//! log_capacity = 100
//!
//! [logging]
//! default_level = "debug"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use lanlab_core::{ConfigError, DEFAULT_SUBNET_MASK, parse_mask};
use lanlab_logging::LogConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub clock: ClockConfig,
    pub session: SessionConfig,
    pub logging: LogConfig,
}

/// Packet clock tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Progress added to every active packet each tick
    pub progress_per_tick: u32,
    /// Progress at which a packet finishes its current cable
    pub segment_threshold: u32,
    /// Ticks between the first and second key-exchange packet
    pub handshake_ack_delay_ticks: u64,
    /// Wall-clock length of one tick for real-time drivers
    pub tick_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            progress_per_tick: 2,
            segment_threshold: 100,
            handshake_ack_delay_ticks: 60,
            tick_interval_ms: 16,
        }
    }
}

impl ClockConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Ticks a packet spends on each cable
    pub fn ticks_per_segment(&self) -> u64 {
        u64::from(self.segment_threshold.div_ceil(self.progress_per_tick.max(1)))
    }
}

/// Session-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Entries kept in the user-visible log
    pub log_capacity: usize,
    /// Mask given to newly placed devices
    pub default_subnet_mask: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_capacity: 50,
            default_subnet_mask: DEFAULT_SUBNET_MASK.to_string(),
        }
    }
}

impl LabConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LabConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.progress_per_tick == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.progress_per_tick",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.clock.segment_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.segment_threshold",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.clock.progress_per_tick > self.clock.segment_threshold {
            return Err(ConfigError::Invalid {
                field: "clock.progress_per_tick",
                reason: format!(
                    "{} exceeds segment_threshold {}",
                    self.clock.progress_per_tick, self.clock.segment_threshold
                ),
            });
        }
        if self.session.log_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "session.log_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        parse_mask(&self.session.default_subnet_mask).map_err(|e| ConfigError::Invalid {
            field: "session.default_subnet_mask",
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LabConfig::default();
        assert_eq!(config.clock.progress_per_tick, 2);
        assert_eq!(config.clock.segment_threshold, 100);
        assert_eq!(config.clock.ticks_per_segment(), 50);
        assert_eq!(config.session.log_capacity, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = LabConfig::from_toml_str(
            r#"
            [clock]
            progress_per_tick = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.clock.progress_per_tick, 25);
        assert_eq!(config.clock.ticks_per_segment(), 4);
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.logging, LogConfig::default());
    }

    #[test]
    fn test_logging_section() {
        let config = LabConfig::from_toml_str(
            r#"
            [logging]
            default_level = "debug"

            [logging.file]
            directory = "/tmp/lanlab"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.default_level, "debug");
        assert_eq!(config.logging.file.unwrap().prefix, "lanlab");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(LabConfig::from_toml_str("").unwrap(), LabConfig::default());
    }

    #[test]
    fn test_rejects_zero_increment() {
        let err = LabConfig::from_toml_str("[clock]\nprogress_per_tick = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "clock.progress_per_tick", .. }));
    }

    #[test]
    fn test_rejects_bad_mask() {
        let err = LabConfig::from_toml_str("[session]\ndefault_subnet_mask = \"255.0.255.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "session.default_subnet_mask", .. }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(LabConfig::from_toml_str("[clock"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_ticks_per_segment_rounds_up() {
        let clock = ClockConfig {
            progress_per_tick: 30,
            ..Default::default()
        };
        assert_eq!(clock.ticks_per_segment(), 4);
    }
}
