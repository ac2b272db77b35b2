//! Function-pointer finite state machine driving network attach.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌──────────────────┬──────────┬──────────┬────────────────┐ │
//! │  │ StateId          │ on_enter │ on_exit  │ on_update      │ │
//! │  ├──────────────────┼──────────┼──────────┼────────────────┤ │
//! │  │ PollingForAttach │ fn(ctx)  │    -     │ fn -> Option<> │ │
//! │  │ ResettingModem   │ fn(ctx)  │ fn(ctx)  │ fn -> Option<> │ │
//! │  │ Attached         │ fn(ctx)  │    -     │ fn -> Option<> │ │
//! │  │ TimedOut         │ fn(ctx)  │    -     │ fn -> Option<> │ │
//! │  └──────────────────┴──────────┴──────────┴────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the current state.  If it
//! returns `Some(next_id)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next.  Handlers only read and write the
//! [`AttachContext`]; the registration supervisor in
//! [`modem::registration`](crate::modem) performs the I/O the current
//! state asks for (status query, silent reset, delay) between ticks.

pub mod context;
pub mod states;

use context::AttachContext;
use log::{debug, info};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every state of the attach supervisor.
/// Must stay in sync with [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    PollingForAttach = 0,
    ResettingModem = 1,
    Attached = 2,
    TimedOut = 3,
}

impl StateId {
    pub const COUNT: usize = 4;

    /// Convert a table index back to `StateId`.  Out-of-range indices map
    /// to `TimedOut` in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::PollingForAttach,
            1 => Self::ResettingModem,
            2 => Self::Attached,
            3 => Self::TimedOut,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::TimedOut
            }
        }
    }

    /// No transition leaves this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Attached | Self::TimedOut)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

pub type StateActionFn = fn(&mut AttachContext);

/// Returns `Some(next)` to trigger a transition, `None` to stay.
pub type StateUpdateFn = fn(&mut AttachContext) -> Option<StateId>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Table for the attach supervisor, starting in `PollingForAttach`.
    pub fn attach() -> Self {
        Self::new(states::build_state_table(), StateId::PollingForAttach)
    }

    /// Run `on_enter` for the initial state.  Call once before `tick()`.
    pub fn start(&mut self, ctx: &mut AttachContext) {
        debug!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate the current state against `ctx` and take at most one
    /// transition.  Returns the state after the tick.
    pub fn tick(&mut self, ctx: &mut AttachContext) -> StateId {
        self.tick_count += 1;

        if let Some(next_id) = (self.table[self.current].on_update)(ctx) {
            self.transition(next_id, ctx);
        }
        self.current_state()
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut AttachContext) {
        let next_idx = next_id as usize;

        info!(
            "Registration: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
