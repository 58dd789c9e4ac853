//! Centralized configuration management

use crate::error::BridgeError;
use embassy_time::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Tunables for the bridge loop. Compiled-in defaults can be overridden by a
/// JSON blob stored next to the device name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub tick_interval_ms: u64,
    pub max_bytes_per_tick: usize,
    pub restart_grace_ms: u64,
    pub watchdog_timeout_s: u64,
    pub serial_settle_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            max_bytes_per_tick: 32,
            restart_grace_ms: 100,
            watchdog_timeout_s: 3,
            serial_settle_ms: 1000,
        }
    }
}

impl BridgeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn restart_grace(&self) -> Duration {
        Duration::from_millis(self.restart_grace_ms)
    }

    pub fn watchdog_timeout(&self) -> Duration {
        Duration::from_secs(self.watchdog_timeout_s)
    }

    pub fn serial_settle(&self) -> Duration {
        Duration::from_millis(self.serial_settle_ms)
    }

    /// Each loop iteration, including a pending restart grace delay, has to
    /// finish well inside the watchdog timeout.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.max_bytes_per_tick == 0 {
            return Err(BridgeError::ConfigError("max_bytes_per_tick must be at least 1".to_string()));
        }
        let timeout_ms = self.watchdog_timeout_s.saturating_mul(1000);
        if self.tick_interval_ms >= timeout_ms {
            return Err(BridgeError::ConfigError(format!(
                "tick interval {}ms must be below watchdog timeout {}ms",
                self.tick_interval_ms, timeout_ms
            )));
        }
        if self.restart_grace_ms >= timeout_ms {
            return Err(BridgeError::ConfigError(format!(
                "restart grace {}ms must be below watchdog timeout {}ms",
                self.restart_grace_ms, timeout_ms
            )));
        }
        Ok(())
    }

    /// Parse a stored override blob, falling back to defaults when it is
    /// unreadable or fails validation.
    pub fn from_json_or_default(data: &[u8]) -> Self {
        match serde_json::from_slice::<BridgeConfig>(data) {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    info!("Loaded bridge config override: {:?}", config);
                    config
                }
                Err(e) => {
                    warn!("Ignoring stored bridge config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to parse stored bridge config: {:?} - using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.restart_grace(), Duration::from_millis(100));
        assert_eq!(config.watchdog_timeout(), Duration::from_secs(3));
        assert_eq!(config.serial_settle(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_override() {
        let config = BridgeConfig::from_json_or_default(br#"{"max_bytes_per_tick": 8}"#);
        assert_eq!(config.max_bytes_per_tick, 8);
        assert_eq!(config.tick_interval_ms, 5);
    }

    #[test]
    fn test_tick_must_beat_watchdog() {
        let config = BridgeConfig {
            tick_interval_ms: 3000,
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
        let config = BridgeConfig::from_json_or_default(br#"{"tick_interval_ms": 5000}"#);
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(BridgeConfig::from_json_or_default(b"not json"), BridgeConfig::default());
    }
}
