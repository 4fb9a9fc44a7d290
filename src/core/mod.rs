//! Engine core: lifecycle state machine and its controller loop.
//!
//! The only public API from this module is [`Engine`] (the handle),
//! [`EngineBuilder`] and [`EngineState`].
//!
//! Internal modules:
//! - [`controller`]: the single loop that owns every transition;
//! - [`command`]: the intake queue and completion callback minting;
//! - [`context`]: one runtime context (bridge plus subsystems) and its disposal order;
//! - [`restart`]: which subsystems survive a restart;
//! - [`sequencer`]: module load ordering against the current context;
//! - [`roots`]: root bindings kept across restarts;
//! - [`watchdog`]: per-attempt init timeout;
//! - [`state`]: the lifecycle state and its watch cell.

mod builder;
mod command;
mod context;
mod controller;
mod handle;
mod restart;
mod roots;
mod sequencer;
mod state;
mod watchdog;

pub use builder::EngineBuilder;
pub use handle::Engine;
pub use state::EngineState;
