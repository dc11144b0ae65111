//! Pump controller — single writer of pump state.
//!
//! Manual commands and automatic evaluation both enter through this type,
//! so there is exactly one place where the relay decision is made.  Within
//! one control cycle a manual command always wins: after
//! [`PumpController::handle_command`] has been applied, the automatic
//! [`PumpController::evaluate`] does nothing until the next
//! [`PumpController::begin_cycle`].

use log::debug;

use crate::app::commands::ManualCommand;
use crate::config::SystemConfig;
use crate::fsm::context::{PumpContext, Relay};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Mode, StateId, Transition};

/// Read-only view of the pump for telemetry and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpState {
    pub relay: Relay,
    pub mode: Mode,
    /// Monotonic ms of the last switch-on, absent while off.
    pub activation_ms: Option<u64>,
}

pub struct PumpController {
    fsm: Fsm,
    ctx: PumpContext,
    manual_off_holds: bool,
    /// Set once a manual command lands in the current cycle.
    manual_applied: bool,
}

impl PumpController {
    /// Build the state table and enter `AutoIdle` (relay off).
    pub fn new(config: &SystemConfig) -> Self {
        let mut ctx = PumpContext::new(config);
        let mut fsm = Fsm::new(build_state_table(), StateId::AutoIdle);
        fsm.start(&mut ctx);
        Self {
            fsm,
            ctx,
            manual_off_holds: config.manual_off_holds,
            manual_applied: false,
        }
    }

    /// Open a new control cycle; re-arms automatic evaluation.
    pub fn begin_cycle(&mut self) {
        self.manual_applied = false;
    }

    /// Apply an operator command.  Always takes effect, whatever the
    /// current state, moisture or timer.
    pub fn handle_command(&mut self, cmd: ManualCommand, now_ms: u64) -> Option<Transition> {
        self.manual_applied = true;
        self.ctx.now_ms = now_ms;

        match cmd {
            ManualCommand::On => {
                if self.fsm.current_state() == StateId::ManualOn {
                    // Repeated ON restarts the activation stamp.
                    self.ctx.switch_on();
                    debug!("pump: manual ON re-stamped at {} ms", now_ms);
                    return None;
                }
                self.fsm.force_transition(StateId::ManualOn, &mut self.ctx)
            }
            ManualCommand::Off => {
                let target = if self.manual_off_holds {
                    StateId::ManualOff
                } else {
                    StateId::AutoIdle
                };
                let t = self.fsm.force_transition(target, &mut self.ctx);
                // Already in the target state: the relay is off either way.
                self.ctx.switch_off();
                t
            }
        }
    }

    /// Automatic step: feed the latest moisture reading and the current
    /// time.  No-op when a manual command was applied this cycle.
    pub fn evaluate(&mut self, moisture_pct: u8, now_ms: u64) -> Option<Transition> {
        self.ctx.moisture_pct = Some(moisture_pct);
        self.ctx.now_ms = now_ms;

        if self.manual_applied {
            debug!("pump: manual command this cycle, automatic step skipped");
            return None;
        }
        if self.fsm.current_state().mode() == Mode::Manual {
            return None;
        }

        let t = self.fsm.tick(&mut self.ctx);
        if let Some(t) = t {
            debug!("pump: {:?} -> {:?} at {}%", t.from, t.to, moisture_pct);
        }
        t
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn relay_on(&self) -> bool {
        self.ctx.relay.is_on()
    }

    pub fn pump_state(&self) -> PumpState {
        PumpState {
            relay: self.ctx.relay,
            mode: self.fsm.current_state().mode(),
            activation_ms: self.ctx.activation_ms,
        }
    }
}
