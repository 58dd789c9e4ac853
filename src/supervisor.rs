//! Connection supervisor: tracks the phone link and decides when a reading is
//! published and when the device has to restart.
//! States: Disconnected, Connected, RestartPending

use crate::types::{ConnectionState, LinkStatus, WeightReading};
use log::{debug, info, warn};
use statig::prelude::*;

// Input events to the state machine
#[derive(Debug, Clone)]
pub enum LinkInput {
    Connect,
    Disconnect,
    /// A reading was just produced by the emitter.
    Emission(WeightReading),
}

// Output actions for the bridge loop to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorAction {
    ShowStatus(LinkStatus),
    /// Send the sync marker followed by this reading's record.
    Publish(WeightReading),
    Restart,
}

#[derive(Debug, Default)]
pub struct SupervisorContext {
    ever_connected: bool,
    last_emitted: Option<WeightReading>,
    outputs: heapless::Vec<SupervisorAction, 4>,
}

#[derive(Debug, Default)]
pub struct LinkStateMachine;

#[state_machine(
    initial = "State::disconnected()",
    state(derive(Debug, PartialEq, Eq)),
    on_transition = "Self::on_transition"
)]
impl LinkStateMachine {
    #[state]
    fn disconnected(context: &mut SupervisorContext, event: &LinkInput) -> Response<State> {
        use Response::*;

        match event {
            LinkInput::Connect => {
                context.ever_connected = true;
                let _ = context.outputs.push(SupervisorAction::ShowStatus(LinkStatus::Connected));
                Transition(State::connected())
            }
            LinkInput::Disconnect => {
                let _ = context.outputs.push(SupervisorAction::ShowStatus(LinkStatus::Disconnected));
                Handled
            }
            LinkInput::Emission(_) if context.ever_connected => {
                warn!("BLE link lost after connection - restart required");
                let _ = context.outputs.push(SupervisorAction::Restart);
                Transition(State::restart_pending())
            }
            LinkInput::Emission(_) => {
                debug!("No peer connected yet, reading not published");
                Handled
            }
        }
    }

    #[state]
    fn connected(context: &mut SupervisorContext, event: &LinkInput) -> Response<State> {
        use Response::*;

        match event {
            LinkInput::Connect => {
                let _ = context.outputs.push(SupervisorAction::ShowStatus(LinkStatus::Connected));
                Handled
            }
            LinkInput::Disconnect => {
                let _ = context.outputs.push(SupervisorAction::ShowStatus(LinkStatus::Disconnected));
                Transition(State::disconnected())
            }
            LinkInput::Emission(reading) => {
                context.last_emitted = Some(*reading);
                let _ = context.outputs.push(SupervisorAction::Publish(*reading));
                Handled
            }
        }
    }

    /// Terminal: the loop is about to reset the chip.
    #[state]
    fn restart_pending(event: &LinkInput) -> Response<State> {
        debug!("Restart pending, ignoring {:?}", event);
        Response::Handled
    }

    fn on_transition(&mut self, source: &State, target: &State) {
        info!("Link state transition: {:?} -> {:?}", source, target);
    }
}

// Main interface for the supervisor
pub struct ConnectionSupervisor {
    machine: statig::prelude::StateMachine<LinkStateMachine>,
    context: SupervisorContext,
}

impl ConnectionSupervisor {
    pub fn new() -> Self {
        Self {
            machine: LinkStateMachine::default().state_machine(),
            context: SupervisorContext::default(),
        }
    }

    /// Process an input event and return the actions to carry out, in order.
    pub fn handle_input(&mut self, input: LinkInput) -> heapless::Vec<SupervisorAction, 4> {
        self.context.outputs.clear();
        self.machine.handle_with_context(&input, &mut self.context);
        std::mem::take(&mut self.context.outputs)
    }

    pub fn connection_state(&self) -> ConnectionState {
        match self.machine.state() {
            State::Connected {} => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Set on the first connection and only cleared by a restart.
    pub fn ever_connected(&self) -> bool {
        self.context.ever_connected
    }

    pub fn restart_pending(&self) -> bool {
        matches!(self.machine.state(), State::RestartPending {})
    }

    pub fn last_emitted(&self) -> Option<&WeightReading> {
        self.context.last_emitted.as_ref()
    }
}

impl Default for ConnectionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
