//! # Runtime events emitted by the engine controller.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: initialization, restart and teardown flow
//! - **Module events**: module loads and root bindings
//! - **Host events**: pause/resume, script exceptions, dev-server errors
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, root id,
//! attempt number, engine state and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use enginevisor::{EngineState, Event, EventKind, RootId};
//!
//! let ev = Event::new(EventKind::ModuleLoadFailed)
//!     .with_root(RootId(7))
//!     .with_reason("bundle rejected")
//!     .with_attempt(2)
//!     .with_state(EngineState::Ready);
//!
//! assert_eq!(ev.kind, EventKind::ModuleLoadFailed);
//! assert_eq!(ev.root, Some(RootId(7)));
//! assert_eq!(ev.reason.as_deref(), Some("bundle rejected"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::capabilities::RootId;
use crate::core::EngineState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Lifecycle events ===
    /// A new initialization attempt is starting.
    ///
    /// Sets:
    /// - `attempt`: attempt number (1-based, per engine)
    /// - `state`: `Initing` or `Restarting`
    InitStarting,

    /// The attempt settled successfully; the engine is usable.
    ///
    /// Sets:
    /// - `attempt`: attempt number
    /// - `status`: `ok` or `err_dev_server`
    EngineReady,

    /// The attempt failed; the engine is unusable until restarted.
    ///
    /// Sets:
    /// - `attempt`: attempt number
    /// - `status`: failure status label
    /// - `reason`: failure message
    EngineErrored,

    /// The initialization watchdog fired.
    ///
    /// Sets:
    /// - `attempt`: attempt number
    /// - `timeout_ms`: configured watchdog (ms)
    InitTimeoutHit,

    /// A completion arrived that no longer matches the engine state or attempt.
    ///
    /// Sets:
    /// - `attempt`: attempt the completion belonged to
    /// - `state`: engine state when it arrived
    /// - `reason`: what was dropped
    StaleCompletionDropped,

    /// A development reload was requested.
    ReloadRequested,

    /// The previous runtime context is being replaced.
    ///
    /// Sets:
    /// - `attempt`: attempt being replaced
    /// - `reason`: `"dev-reload"` or `"recovery"`
    RestartStarting,

    /// The render tree was handed to the next runtime context.
    RenderTreeCarried,

    /// The render tree was destroyed together with its runtime context.
    RenderTreeDiscarded,

    /// Teardown was requested.
    DestroyRequested,

    /// The engine reached its terminal state.
    EngineDestroyed,

    // === Module events ===
    /// A module load request was accepted by the controller.
    ///
    /// Sets:
    /// - `reason`: component name
    ModuleLoadStarting,

    /// A module finished loading.
    ///
    /// Sets:
    /// - `root`: root id
    ModuleLoaded,

    /// A module load finished with a non-OK status.
    ///
    /// Sets:
    /// - `root`: root id, when one was bound
    /// - `status`: module status label
    /// - `reason`: failure message
    ModuleLoadFailed,

    /// A surface was bound to a root id.
    RootBound,

    /// A root binding was released after its instance was destroyed.
    RootUnbound,

    // === Host events ===
    /// Host went to background.
    EnginePaused,

    /// Host came back to foreground.
    EngineResumed,

    /// The running application raised an exception.
    ///
    /// Sets:
    /// - `reason`: exception message
    ScriptException,

    /// The development server could not be reached.
    ///
    /// Sets:
    /// - `reason`: error message
    DevServerError,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Watchdog timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Initialization attempt (starting from 1).
    pub attempt: Option<u64>,
    /// Root the event refers to.
    pub root: Option<RootId>,
    /// Engine state observed when the event was produced.
    pub state: Option<EngineState>,
    /// Status label (`ok`, `wrong_state`, `variable_null`, ...).
    pub status: Option<&'static str>,
    /// Subscriber name (subscriber events only).
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            timeout_ms: None,
            reason: None,
            attempt: None,
            root: None,
            state: None,
            status: None,
            subscriber: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a watchdog duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a root id.
    #[inline]
    pub fn with_root(mut self, root: RootId) -> Self {
        self.root = Some(root);
        self
    }

    /// Attaches the observed engine state.
    #[inline]
    pub fn with_state(mut self, state: EngineState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a status label.
    #[inline]
    pub fn with_status(mut self, label: &'static str) -> Self {
        self.status = Some(label);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::InitStarting);
        let b = Event::new(EventKind::EngineReady);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_timeout_saturates() {
        let ev = Event::new(EventKind::InitTimeoutHit).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }

    #[test]
    fn test_subscriber_overflow_carries_name() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
