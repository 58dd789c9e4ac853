use crate::{
    commands::CommandDispatcher,
    device_name::DeviceName,
    frame::{DecodeOutcome, FrameDecoder, WeightEmitter},
    protocol::SYNC_MARKER,
    supervisor::{ConnectionSupervisor, LinkInput, SupervisorAction},
    system::{BridgeConfig, BridgeEvent, EventChannel},
    traits::{NameStore, ScaleLink, StatusIndicator, Watchdog, WeightNotifier},
    types::{RestartReason, WeightReading},
};
use bstr::ByteSlice;
use embassy_time::Timer;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Outcome of one pass of the bridge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    Restart(RestartReason),
}

/// Everything the bridge loop owns. Serial bytes and BLE events are handled
/// here one at a time, so no state is shared with the BLE callbacks.
pub struct Bridge<S, N, I, P> {
    scale: S,
    notifier: N,
    indicator: I,
    names: P,
    events: Arc<EventChannel>,
    config: BridgeConfig,

    decoder: FrameDecoder,
    emitter: WeightEmitter,
    dispatcher: CommandDispatcher,
    supervisor: ConnectionSupervisor,
}

impl<S, N, I, P> Bridge<S, N, I, P>
where
    S: ScaleLink,
    N: WeightNotifier,
    I: StatusIndicator,
    P: NameStore,
{
    pub fn new(
        scale: S,
        notifier: N,
        indicator: I,
        names: P,
        events: Arc<EventChannel>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            scale,
            notifier,
            indicator,
            names,
            events,
            config,
            decoder: FrameDecoder::new(),
            emitter: WeightEmitter::new(),
            dispatcher: CommandDispatcher::new(),
            supervisor: ConnectionSupervisor::new(),
        }
    }

    /// Run until the device has to restart. The watchdog is fed once per
    /// tick; a pending restart waits out the grace delay before returning.
    pub async fn run<W: Watchdog>(&mut self, watchdog: &mut W) -> RestartReason {
        info!(
            "Bridge loop running (tick {}ms, {} bytes/tick)",
            self.config.tick_interval_ms, self.config.max_bytes_per_tick
        );

        loop {
            let step = self.step();
            watchdog.feed();

            if let Step::Restart(reason) = step {
                warn!(
                    "Restarting in {}ms ({:?})",
                    self.config.restart_grace_ms, reason
                );
                Timer::after(self.config.restart_grace()).await;
                return reason;
            }

            Timer::after(self.config.tick_interval()).await;
        }
    }

    /// One bounded pass: pending events are drained between serial bytes, and
    /// at most `max_bytes_per_tick` bytes are decoded.
    pub fn step(&mut self) -> Step {
        for _ in 0..self.config.max_bytes_per_tick {
            if let Step::Restart(reason) = self.drain_events() {
                return Step::Restart(reason);
            }

            let Some(byte) = self.scale.read_byte() else {
                break;
            };

            if let Step::Restart(reason) = self.process_byte(byte) {
                return Step::Restart(reason);
            }
        }

        self.drain_events()
    }

    fn drain_events(&mut self) -> Step {
        while let Ok(event) = self.events.try_receive() {
            if let Step::Restart(reason) = self.handle_event(event) {
                return Step::Restart(reason);
            }
        }
        Step::Idle
    }

    pub fn handle_event(&mut self, event: BridgeEvent) -> Step {
        match event {
            BridgeEvent::Connected => {
                info!("Device connected");
                let actions = self.supervisor.handle_input(LinkInput::Connect);
                self.apply(&actions)
            }
            BridgeEvent::Disconnected => {
                info!("Device disconnected");
                let actions = self.supervisor.handle_input(LinkInput::Disconnect);
                self.apply(&actions)
            }
            BridgeEvent::CommandWrite(text) => {
                self.dispatcher.dispatch(&text, &mut self.scale);
                Step::Idle
            }
            BridgeEvent::RenameWrite(raw) => self.rename(&raw),
        }
    }

    /// Feed one serial byte; a completed frame is emitted and handed to the
    /// supervisor straight away.
    pub fn process_byte(&mut self, byte: u8) -> Step {
        match self.decoder.push(byte) {
            DecodeOutcome::Complete => {
                let reading = self.emitter.emit(&mut self.decoder);
                let actions = self.supervisor.handle_input(LinkInput::Emission(reading));
                self.apply(&actions)
            }
            DecodeOutcome::Pending | DecodeOutcome::Overflow => Step::Idle,
        }
    }

    fn rename(&mut self, raw: &[u8]) -> Step {
        let name = match DeviceName::parse(raw) {
            Ok(name) => name,
            Err(e) => {
                warn!("Rejected rename to {:?}: {}", raw.as_bstr(), e);
                return Step::Idle;
            }
        };

        info!("Received new name: {}", name);
        match self.names.store_name(&name) {
            Ok(()) => Step::Restart(RestartReason::Renamed),
            Err(e) => {
                error!("Failed to persist device name: {}", e);
                Step::Idle
            }
        }
    }

    fn apply(&mut self, actions: &[SupervisorAction]) -> Step {
        for action in actions {
            match action {
                SupervisorAction::ShowStatus(status) => self.indicator.show(*status),
                SupervisorAction::Publish(reading) => self.publish(reading),
                SupervisorAction::Restart => return Step::Restart(RestartReason::LinkLost),
            }
        }
        Step::Idle
    }

    /// The app expects two separate notifications: the sync marker, then the record.
    fn publish(&mut self, reading: &WeightReading) {
        if let Err(e) = self.notifier.notify(&SYNC_MARKER) {
            warn!("Failed to notify sync marker: {}", e);
        }
        let payload = reading.to_payload();
        match self.notifier.notify(&payload) {
            Ok(()) => debug!("Notified {:?}", payload.as_bstr()),
            Err(e) => warn!("Failed to notify weight: {}", e),
        }
    }

    pub fn supervisor(&self) -> &ConnectionSupervisor {
        &self.supervisor
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    pub fn emitter(&self) -> &WeightEmitter {
        &self.emitter
    }

    pub fn scale(&self) -> &S {
        &self.scale
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn names(&self) -> &P {
        &self.names
    }
}
