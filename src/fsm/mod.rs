//! Function-pointer finite state machine engine for the pump.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌─────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId     │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ AutoIdle    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ AutoRunning │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ ManualOn    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ ManualOff   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  └─────────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each evaluation the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the current
//! pointer.  Manual commands bypass `on_update` through
//! [`Fsm::force_transition`].

pub mod context;
pub mod states;

use context::PumpContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all pump states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    AutoIdle = 0,
    AutoRunning = 1,
    ManualOn = 2,
    ManualOff = 3,
}

impl StateId {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Out-of-range indices fall back
    /// to `AutoIdle` (relay off) in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::AutoIdle,
            1 => Self::AutoRunning,
            2 => Self::ManualOn,
            3 => Self::ManualOff,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::AutoIdle
            }
        }
    }

    /// Which control source owns the relay in this state.
    pub fn mode(self) -> Mode {
        match self {
            Self::AutoIdle | Self::AutoRunning => Mode::Automatic,
            Self::ManualOn | Self::ManualOff => Mode::Manual,
        }
    }
}

/// Control source currently owning the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Automatic,
    Manual,
}

/// A state change, reported to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut PumpContext);

/// Signature for the per-evaluation update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&PumpContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut PumpContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate the current state once against `ctx`.
    pub fn tick(&mut self, ctx: &mut PumpContext) -> Option<Transition> {
        let next = (self.table[self.current].on_update)(ctx)?;
        Some(self.transition(next, ctx))
    }

    /// Jump straight to `next`.  No-op when already there.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut PumpContext) -> Option<Transition> {
        if next as usize == self.current {
            return None;
        }
        Some(self.transition(next, ctx))
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut PumpContext) -> Transition {
        let from = self.current_state();
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }

        Transition { from, to: next_id }
    }
}
