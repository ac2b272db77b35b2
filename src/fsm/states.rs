//! Attach-state handlers and table builder.
//!
//! ```text
//!  POLLING ──[registered]──────────▶ ATTACHED
//!    │  ▲
//!    │  └──────[reset issued]─────── RESETTING
//!    │                                   ▲
//!    ├──[stuck && reset deadline]────────┘
//!    │
//!    └──[bounded && past give-up]────▶ TIMED OUT
//! ```

use super::context::AttachContext;
use super::{StateDescriptor, StateId};
use log::{error, info, warn};

/// Build the state table.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::PollingForAttach,
            name: "PollingForAttach",
            on_enter: Some(polling_enter),
            on_exit: None,
            on_update: polling_update,
        },
        StateDescriptor {
            id: StateId::ResettingModem,
            name: "ResettingModem",
            on_enter: Some(resetting_enter),
            on_exit: Some(resetting_exit),
            on_update: resetting_update,
        },
        StateDescriptor {
            id: StateId::Attached,
            name: "Attached",
            on_enter: Some(attached_enter),
            on_exit: None,
            on_update: stay,
        },
        StateDescriptor {
            id: StateId::TimedOut,
            name: "TimedOut",
            on_enter: Some(timed_out_enter),
            on_exit: None,
            on_update: stay,
        },
    ]
}

fn stay(_ctx: &mut AttachContext) -> Option<StateId> {
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  POLLING
// ═══════════════════════════════════════════════════════════════════════════

fn polling_enter(ctx: &mut AttachContext) {
    info!("Waiting for network registration (resets so far: {})", ctx.resets);
}

fn polling_update(ctx: &mut AttachContext) -> Option<StateId> {
    if ctx.is_registered() {
        return Some(StateId::Attached);
    }
    if ctx.status.is_some_and(|s| s.is_stuck()) {
        ctx.needs_reset = true;
    }
    if ctx.past_give_up() {
        return Some(StateId::TimedOut);
    }
    if ctx.reset_due() {
        return Some(StateId::ResettingModem);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESETTING: the supervisor issues the silent reset while here
// ═══════════════════════════════════════════════════════════════════════════

fn resetting_enter(ctx: &mut AttachContext) {
    ctx.resets += 1;
    info!("Failed to connect to network, resetting (status {:?})", ctx.status);
}

fn resetting_update(_ctx: &mut AttachContext) -> Option<StateId> {
    Some(StateId::PollingForAttach)
}

fn resetting_exit(ctx: &mut AttachContext) {
    ctx.needs_reset = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  Terminal states
// ═══════════════════════════════════════════════════════════════════════════

fn attached_enter(ctx: &mut AttachContext) {
    info!("Network registration complete: {:?}", ctx.status);
}

fn timed_out_enter(ctx: &mut AttachContext) {
    if ctx.needs_reset {
        warn!("Giving up while the module still needed a reset");
    }
    error!("Bailing out from network registration (bounded wait)");
}
