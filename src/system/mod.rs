pub mod config;
pub mod events;

pub use config::BridgeConfig;
pub use events::{post_event, BridgeEvent, EventChannel, EVENT_QUEUE_DEPTH, LINK_EVENT_RESERVE};
