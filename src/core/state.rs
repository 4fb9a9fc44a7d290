//! # Engine lifecycle state.
//!
//! ```text
//!            start()              bridge OK / dev-server error
//!   Uninit ───────────► Initing ─────────────────────────────► Ready
//!                          │ bridge error / construction        │
//!                          │ failure / watchdog                 │ reload() / restart()
//!                          ▼                                    ▼
//!                       Errored ◄──────────────────────────  Restarting
//!                          │         failure                    │
//!                          └──── restart() ──► Restarting       └── OK ──► Ready
//!
//!   any state ── destroy() ──► Destroyed   (terminal, never left)
//! ```
//!
//! ## Rules
//! - Every transition is a compare-and-set against an allowed source set.
//! - `Destroyed` accepts no transition, including `Destroyed → Destroyed`.
//! - Readers observe the state through a `watch` channel; they never block the writer.

use std::fmt;

use tokio::sync::watch;

/// Lifecycle state of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Created, `start` not called yet.
    Uninit,
    /// First initialization attempt in flight.
    Initing,
    /// A restart attempt is in flight.
    Restarting,
    /// Engine usable.
    Ready,
    /// Last attempt failed.
    Errored,
    /// Torn down. Terminal.
    Destroyed,
}

impl EngineState {
    /// Every state except `Destroyed`.
    pub(crate) const LIVE: &'static [EngineState] = &[
        EngineState::Uninit,
        EngineState::Initing,
        EngineState::Restarting,
        EngineState::Ready,
        EngineState::Errored,
    ];

    /// Initialization (first or restart) in flight.
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, EngineState::Initing | EngineState::Restarting)
    }

    /// True for `Destroyed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineState::Destroyed)
    }

    /// Settled outcome of an attempt (`Ready` or `Errored`).
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self, EngineState::Ready | EngineState::Errored)
    }

    /// Stable label for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineState::Uninit => "uninit",
            EngineState::Initing => "initing",
            EngineState::Restarting => "restarting",
            EngineState::Ready => "ready",
            EngineState::Errored => "errored",
            EngineState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Single writer of the engine state.
///
/// Owned by the controller loop; handles hold receivers from [`StateCell::subscribe`].
pub(crate) struct StateCell {
    tx: watch::Sender<EngineState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(EngineState::Uninit);
        Self { tx }
    }

    #[inline]
    pub(crate) fn get(&self) -> EngineState {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.tx.subscribe()
    }

    /// Moves to `to` if the current state is one of `from`.
    ///
    /// Returns the previous state, or the current state when the transition was refused.
    pub(crate) fn transition(
        &self,
        from: &[EngineState],
        to: EngineState,
    ) -> Result<EngineState, EngineState> {
        let mut outcome = Err(EngineState::Destroyed);
        self.tx.send_if_modified(|cur| {
            if cur.is_terminal() || !from.contains(cur) {
                outcome = Err(*cur);
                return false;
            }
            outcome = Ok(*cur);
            let changed = *cur != to;
            *cur = to;
            changed
        });
        outcome
    }
}
