use serde::{Deserialize, Serialize};

/// Weight unit as announced by the scale. `Unknown` until the first unit byte arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    Unknown,
    Pounds,
    Kilograms,
}

impl Unit {
    /// Two-byte code used in the notification record. Unknown is sent as NULs.
    pub fn code(self) -> [u8; 2] {
        match self {
            Unit::Unknown => [0x00, 0x00],
            Unit::Pounds => *b"LB",
            Unit::Kilograms => *b"KG",
        }
    }
}

/// Gross/net weighing mode. `Unknown` until the first mode byte arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Unknown,
    Gross,
    Net,
}

impl Mode {
    pub fn code(self) -> [u8; 2] {
        match self {
            Mode::Unknown => [0x00, 0x00],
            Mode::Gross => *b"GR",
            Mode::Net => *b"NT",
        }
    }
}

/// Fields carried from byte to byte (and frame to frame) while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeContext {
    pub unit: Unit,
    pub mode: Mode,
    pub lock_flag: bool,
}

/// One completed reading from the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightReading {
    pub digits: [u8; WEIGHT_DIGITS],
    pub unit: Unit,
    pub mode: Mode,
    pub lock_flag: bool,
}

impl WeightReading {
    /// The record sent over the weight characteristic:
    /// 8 digits, space, unit, space, mode, CR, LF, NUL.
    pub fn to_payload(&self) -> [u8; WEIGHT_RECORD_LEN] {
        let mut payload = [0u8; WEIGHT_RECORD_LEN];
        payload[..WEIGHT_DIGITS].copy_from_slice(&self.digits);
        payload[8] = b' ';
        payload[9..11].copy_from_slice(&self.unit.code());
        payload[11] = b' ';
        payload[12..14].copy_from_slice(&self.mode.code());
        payload[14..16].copy_from_slice(b"\r\n");
        payload
    }
}

/// Wireless link state as seen by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// What the status LED should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

/// Why the main loop is about to restart the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    LinkLost,
    Renamed,
    SerialInitFailed,
}

pub const FRAME_CAPACITY: usize = 24;
pub const FRAME_STORAGE: usize = FRAME_CAPACITY + 1; // one byte of headroom for the sentinel
pub const WEIGHT_DIGITS: usize = 8;
pub const WEIGHT_RECORD_LEN: usize = 17;

pub const DEFAULT_DEVICE_NAME: &str = "Agri-Tronix";
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 20;
pub const ADVERTISED_NAME_MAX_LEN: usize = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_with_unknown_unit_and_mode() {
        let reading = WeightReading {
            digits: *b"   12.34",
            unit: Unit::Unknown,
            mode: Mode::Gross,
            lock_flag: false,
        };
        assert_eq!(&reading.to_payload(), b"   12.34 \0\0 GR\r\n\0");
    }
}
