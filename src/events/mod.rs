//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the engine controller and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the controller loop, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `EngineBuilder::build`
//!   (fans out to `SubscriberSet`) and any receiver from `Engine::events()`.
//!
//! Events are observational only. Listener delivery never depends on the bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
