#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    SerialError(String),
    StorageError(String),
    BleError(String),
    ConfigError(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::SerialError(msg) => write!(f, "Serial error: {}", msg),
            BridgeError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            BridgeError::BleError(msg) => write!(f, "BLE error: {}", msg),
            BridgeError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Why a rename request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    TooShort(usize),
    TooLong(usize),
    InvalidCharacter(char),
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameError::TooShort(len) => write!(f, "name too short ({} chars)", len),
            NameError::TooLong(len) => write!(f, "name too long ({} chars)", len),
            NameError::InvalidCharacter(c) => write!(f, "invalid character {:?} in name", c),
        }
    }
}

impl std::error::Error for NameError {}
