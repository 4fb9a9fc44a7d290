//! # Engine event subscribers.
//!
//! The controller publishes an [`Event`] for every decision it makes: attempts
//! starting and settling, reloads, stale completions it dropped, modules bound
//! and unbound, teardown. [`Subscribe`] is how a host observes that stream
//! without touching the controller loop.
//!
//! ```text
//! EngineController ──► Bus (broadcast) ──► SubscriberSet
//!                                              ├─► [queue] ──► worker ──► on_event()
//!                                              └─► [queue] ──► worker ──► on_event()
//! ```
//!
//! A subscriber owns its queue. When it falls behind, its own events are
//! dropped and `SubscriberOverflow` is published; a panic inside `on_event`
//! becomes `SubscriberPanicked`. Neither reaches the controller or the other
//! subscribers.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use async_trait::async_trait;
//! use enginevisor::{Event, EventKind, Subscribe};
//!
//! /// Counts bridge completions that arrived for a superseded attempt.
//! #[derive(Default)]
//! struct StaleCounter {
//!     dropped: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Subscribe for StaleCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::StaleCompletionDropped {
//!             self.dropped.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "stale-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of engine events.
///
/// Runs on its own worker task, in publish order. Keep `on_event` non-blocking:
/// a slow subscriber only delays itself, but it will start losing events once
/// its queue is full.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber, clamped to at least 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
