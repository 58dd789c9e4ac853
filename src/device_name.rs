//! Advertised device name: validation of rename requests and composition of
//! the name shown to scanning phones.

use crate::error::NameError;
use crate::types::{ADVERTISED_NAME_MAX_LEN, DEFAULT_DEVICE_NAME, NAME_MAX_LEN, NAME_MIN_LEN};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub beta: bool,
}

pub const VERSION: FirmwareVersion = FirmwareVersion {
    major: 1,
    minor: 2,
    patch: 0,
    beta: true,
};

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.beta {
            write!(f, "-beta")?;
        }
        Ok(())
    }
}

/// A validated device name: 3 to 20 characters from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceName(heapless::String<NAME_MAX_LEN>);

impl DeviceName {
    pub fn parse(raw: &[u8]) -> Result<Self, NameError> {
        if raw.len() < NAME_MIN_LEN {
            return Err(NameError::TooShort(raw.len()));
        }
        if raw.len() > NAME_MAX_LEN {
            return Err(NameError::TooLong(raw.len()));
        }
        if let Some(&bad) = raw
            .iter()
            .find(|&&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
        {
            return Err(NameError::InvalidCharacter(bad as char));
        }

        let mut name = heapless::String::new();
        for &b in raw {
            // Length was checked above
            let _ = name.push(b as char);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for DeviceName {
    fn default() -> Self {
        let mut name = heapless::String::new();
        let _ = name.push_str(DEFAULT_DEVICE_NAME);
        Self(name)
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hex digit at index 13 of the `AA:BB:CC:DD:EE:FF` form of the MAC address.
pub fn mac_tag(mac: &[u8; 6]) -> char {
    let nibble = u32::from(mac[4] & 0x0F);
    char::from_digit(nibble, 16)
        .unwrap_or('0')
        .to_ascii_uppercase()
}

/// Compose `<name>[<tag>] v<version>`, shortening the name so the whole
/// string fits in 30 characters.
pub fn advertised_name(name: &DeviceName, tag: char, version: &FirmwareVersion) -> String {
    let version_part = format!(" v{}", version);
    let tag_len = 3;
    let name = name.as_str();

    let total = name.len() + tag_len + version_part.len();
    let name = if total > ADVERTISED_NAME_MAX_LEN {
        let excess = total - ADVERTISED_NAME_MAX_LEN;
        &name[..name.len().saturating_sub(excess)]
    } else {
        name
    };

    format!("{}[{}]{}", name, tag, version_part)
}
