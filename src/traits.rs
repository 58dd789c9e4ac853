//! Seams between the bridge core and the hardware it runs on.
//!
//! The ESP-IDF implementations live in `platform`; tests use in-memory fakes.

use crate::device_name::DeviceName;
use crate::error::BridgeError;
use crate::types::LinkStatus;

/// The serial link to the scale.
pub trait ScaleLink {
    /// Next received byte, if one is waiting. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write a control sequence. Attempted once; the caller does not retry.
    fn write(&mut self, bytes: &[u8]) -> Result<(), BridgeError>;
}

/// Outbound notifications to the connected phone.
pub trait WeightNotifier {
    fn notify(&mut self, payload: &[u8]) -> Result<(), BridgeError>;
}

/// Visual connection status.
pub trait StatusIndicator {
    fn show(&mut self, status: LinkStatus);
}

/// Non-volatile storage for the advertised device name.
pub trait NameStore {
    fn load_name(&mut self) -> Result<Option<DeviceName>, BridgeError>;
    fn store_name(&mut self, name: &DeviceName) -> Result<(), BridgeError>;
}

/// Liveness token for the task watchdog.
pub trait Watchdog {
    fn feed(&mut self);
}
