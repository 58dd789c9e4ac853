use bstr::ByteSlice;
use log::debug;
use uuid::Uuid;

pub const STX: u8 = 0x02;
pub const CR: u8 = 0x0D;
pub const CMD_START: u8 = 0x05;
pub const CMD_END: u8 = 0x03;

pub const SERIAL_BAUD: u32 = 9600;

// Connection interval requested from a new peer, in 1.25 ms units (7.5 ms to
// 22.5 ms).
pub const PREFERRED_CONN_INTERVAL_MIN: u16 = 0x06;
pub const PREFERRED_CONN_INTERVAL_MAX: u16 = 0x12;
/// Supervision timeout in 10 ms units.
pub const PREFERRED_SUPERVISION_TIMEOUT: u16 = 400;

pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x569a1101_b87f_490c_92cb_11ba5ea5167c);
pub const WEIGHT_CHAR_UUID: Uuid = Uuid::from_u128(0x569a2000_b87f_490c_92cb_11ba5ea5167c);
pub const COMMAND_CHAR_UUID: Uuid = Uuid::from_u128(0x569a2001_b87f_490c_92cb_11ba5ea5167c);
pub const LEGACY_NOTIFY_CHAR_UUID: Uuid = Uuid::from_u128(0x569a2002_b87f_490c_92cb_11ba5ea5167c);
pub const COMMAND2_CHAR_UUID: Uuid = Uuid::from_u128(0x569a2003_b87f_490c_92cb_11ba5ea5167c);
pub const DEVICE_NAME_CHAR_UUID: Uuid = Uuid::from_u128(0x00002a00_0000_1000_8000_00805f9b34fb);

/// Sent on the weight characteristic right before every weight record.
pub const SYNC_MARKER: [u8; 2] = [STX, 0x00];

/// Button presses the phone app can forward to the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKeyword {
    Zero,
    Tare,
    Units,
    Net,
    Gross,
}

impl CommandKeyword {
    /// Highest priority first.
    pub const PRIORITY: [CommandKeyword; 5] = [
        CommandKeyword::Zero,
        CommandKeyword::Tare,
        CommandKeyword::Units,
        CommandKeyword::Net,
        CommandKeyword::Gross,
    ];

    pub fn letter(self) -> u8 {
        match self {
            CommandKeyword::Zero => b'z',
            CommandKeyword::Tare => b't',
            CommandKeyword::Units => b'c',
            CommandKeyword::Net => b'n',
            CommandKeyword::Gross => b'g',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKeyword::Zero => "Zero",
            CommandKeyword::Tare => "Tare",
            CommandKeyword::Units => "Units",
            CommandKeyword::Net => "Net",
            CommandKeyword::Gross => "Gross",
        }
    }

    /// Control sequence written to the scale.
    pub fn envelope(self) -> [u8; 3] {
        [CMD_START, self.letter(), CMD_END]
    }

    /// Resolve free-form write text to a keyword. Matching is case-insensitive
    /// substring presence; when several trigger letters occur, the one with the
    /// highest priority wins regardless of position.
    pub fn from_text(text: &[u8]) -> Option<CommandKeyword> {
        if text.is_empty() {
            return None;
        }
        let lowered = text.to_ascii_lowercase();
        let keyword = Self::PRIORITY
            .into_iter()
            .find(|k| lowered.find_byte(k.letter()).is_some());
        debug!("Command text {:?} resolved to {:?}", text.as_bstr(), keyword);
        keyword
    }
}
