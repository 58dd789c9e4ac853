//! Events posted by the BLE stack for the bridge loop.
//!
//! BLE callbacks run on the NimBLE host task. They never touch bridge state
//! directly; everything goes through this queue and is handled by the single
//! loop that owns the frame buffer, the supervisor and the serial port.

use bstr::ByteSlice;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use log::warn;

pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Slots only link events may use, so a burst of writes never pushes out a
/// connect or disconnect.
pub const LINK_EVENT_RESERVE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Connected,
    Disconnected,
    /// Text written to one of the two command characteristics.
    CommandWrite(Vec<u8>),
    /// Text written to the device-name characteristic.
    RenameWrite(Vec<u8>),
}

impl BridgeEvent {
    pub fn is_link_change(&self) -> bool {
        matches!(self, BridgeEvent::Connected | BridgeEvent::Disconnected)
    }
}

pub type EventChannel = Channel<CriticalSectionRawMutex, BridgeEvent, EVENT_QUEUE_DEPTH>;

/// Post from a callback context. A callback must not block the BLE host, so
/// writes are dropped once only the link reserve is left, and any event is
/// dropped when the queue is completely full.
pub fn post_event(channel: &EventChannel, event: BridgeEvent) -> bool {
    if !event.is_link_change() && channel.len() >= EVENT_QUEUE_DEPTH - LINK_EVENT_RESERVE {
        if let BridgeEvent::CommandWrite(data) | BridgeEvent::RenameWrite(data) = &event {
            warn!("Event queue busy, dropping write {:?}", data.as_bstr());
        }
        return false;
    }

    match channel.try_send(event) {
        Ok(()) => true,
        Err(embassy_sync::channel::TrySendError::Full(event)) => {
            match &event {
                BridgeEvent::CommandWrite(data) | BridgeEvent::RenameWrite(data) => {
                    warn!("Event queue full, dropping write {:?}", data.as_bstr())
                }
                other => warn!("Event queue full, dropping {:?}", other),
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_drain_in_order() {
        let channel = EventChannel::new();
        assert!(post_event(&channel, BridgeEvent::Connected));
        assert!(post_event(&channel, BridgeEvent::CommandWrite(b"z".to_vec())));
        assert_eq!(channel.try_receive().ok(), Some(BridgeEvent::Connected));
        assert_eq!(channel.try_receive().ok(), Some(BridgeEvent::CommandWrite(b"z".to_vec())));
        assert!(channel.try_receive().is_err());
    }

    #[test]
    fn test_full_queue_drops() {
        let channel = EventChannel::new();
        for _ in 0..EVENT_QUEUE_DEPTH {
            assert!(post_event(&channel, BridgeEvent::Disconnected));
        }
        assert!(!post_event(&channel, BridgeEvent::Connected));
        assert_eq!(channel.len(), EVENT_QUEUE_DEPTH);
    }

    #[test]
    fn test_writes_leave_room_for_link_events() {
        let channel = EventChannel::new();
        let mut accepted = 0;
        for _ in 0..EVENT_QUEUE_DEPTH {
            if post_event(&channel, BridgeEvent::CommandWrite(b"tare".to_vec())) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, EVENT_QUEUE_DEPTH - LINK_EVENT_RESERVE);
        assert!(!post_event(&channel, BridgeEvent::RenameWrite(b"scale_1".to_vec())));

        assert!(post_event(&channel, BridgeEvent::Disconnected));
        assert!(post_event(&channel, BridgeEvent::Connected));
        assert_eq!(channel.len(), EVENT_QUEUE_DEPTH);
    }
}
