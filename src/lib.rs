pub mod bridge;
pub mod commands;
pub mod device_name;
pub mod error;
pub mod frame;
pub mod hardware;
pub mod protocol;
pub mod supervisor;
pub mod system;
pub mod traits;
pub mod types;

#[cfg(target_os = "espidf")]
pub mod platform;

pub use error::{BridgeError, NameError};
pub use types::*;
