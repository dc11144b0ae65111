//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, with no closures or heap.
//!
//! ```text
//!  AUTO_IDLE ──[moisture <= low]──▶ AUTO_RUNNING
//!      ▲                                 │
//!      └──────[elapsed >= run]───────────┘
//!
//!  any ──[manual ON]──▶ MANUAL_ON          (no time limit)
//!  any ──[manual OFF]─▶ AUTO_IDLE          (or MANUAL_OFF when held)
//! ```

use super::context::PumpContext;
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — AutoIdle
        StateDescriptor {
            id: StateId::AutoIdle,
            name: "AutoIdle",
            on_enter: Some(auto_idle_enter),
            on_exit: None,
            on_update: auto_idle_update,
        },
        // Index 1 — AutoRunning
        StateDescriptor {
            id: StateId::AutoRunning,
            name: "AutoRunning",
            on_enter: Some(auto_running_enter),
            on_exit: None,
            on_update: auto_running_update,
        },
        // Index 2 — ManualOn
        StateDescriptor {
            id: StateId::ManualOn,
            name: "ManualOn",
            on_enter: Some(manual_on_enter),
            on_exit: None,
            on_update: hold,
        },
        // Index 3 — ManualOff
        StateDescriptor {
            id: StateId::ManualOff,
            name: "ManualOff",
            on_enter: Some(manual_off_enter),
            on_exit: None,
            on_update: hold,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AUTO_IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn auto_idle_enter(ctx: &mut PumpContext) {
    ctx.switch_off();
    info!("AUTO_IDLE: pump off, watching moisture");
}

fn auto_idle_update(ctx: &PumpContext) -> Option<StateId> {
    match ctx.moisture_pct {
        Some(pct) if pct <= ctx.low_threshold_pct => Some(StateId::AutoRunning),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  AUTO_RUNNING — fixed-duration watering
// ═══════════════════════════════════════════════════════════════════════════

fn auto_running_enter(ctx: &mut PumpContext) {
    ctx.switch_on();
    info!(
        "AUTO_RUNNING: moisture {:?}% <= {}%, watering for {} ms",
        ctx.moisture_pct, ctx.low_threshold_pct, ctx.run_duration_ms
    );
}

fn auto_running_update(ctx: &PumpContext) -> Option<StateId> {
    match ctx.elapsed_ms() {
        Some(elapsed) if elapsed >= ctx.run_duration_ms => {
            info!("AUTO_RUNNING: run time reached after {} ms", elapsed);
            Some(StateId::AutoIdle)
        }
        Some(_) => None,
        // Entered without a stamp: nothing to time, stop safely.
        None => Some(StateId::AutoIdle),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MANUAL_ON / MANUAL_OFF — operator owns the relay
// ═══════════════════════════════════════════════════════════════════════════

fn manual_on_enter(ctx: &mut PumpContext) {
    ctx.switch_on();
    info!("MANUAL_ON: pump on until released");
}

fn manual_off_enter(ctx: &mut PumpContext) {
    ctx.switch_off();
    info!("MANUAL_OFF: pump held off");
}

/// Manual states only leave on a command.
fn hold(_ctx: &PumpContext) -> Option<StateId> {
    None
}
