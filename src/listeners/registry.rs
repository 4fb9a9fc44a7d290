//! # Pending initialization listeners.
//!
//! [`ListenerRegistry`] holds the [`EngineListener`]s waiting for the current
//! initialization attempt to settle.
//!
//! ## Rules
//! - `notify_all` drains the pending list atomically, then posts **one** job
//!   to the affinity context that invokes every drained listener in
//!   registration order.
//! - A listener registered after the drain is not part of that batch; it waits
//!   for the next settlement or is delivered immediately by the caller.
//! - A panicking listener is logged; the remaining listeners of the batch still run.
//! - Registration id 0 marks a listener delivered without registration.
//!
//! ```text
//! register(l1) register(l2)      notify_all(OK)
//!      │            │                  │ drain (under lock)
//!      ▼            ▼                  ▼
//!   [l1, l2] ───────────────────► [] + post(job: l1(OK); l2(OK))
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::affinity::Affinity;
use crate::listeners::{DestroyModuleCallback, EngineListener, ModuleListener};
use crate::status::{EngineInitStatus, ModuleLoadStatus};
use crate::subscribers::panic_message;

struct PendingListener {
    id: u64,
    listener: Arc<dyn EngineListener>,
}

/// Ordered collection of listeners awaiting the outcome of initialization.
pub(crate) struct ListenerRegistry {
    pending: Mutex<Vec<PendingListener>>,
    next_id: AtomicU64,
    affinity: Arc<dyn Affinity>,
}

impl ListenerRegistry {
    pub(crate) fn new(affinity: Arc<dyn Affinity>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            affinity,
        }
    }

    /// Adds `listener` to the pending list and returns its registration id.
    pub(crate) fn register(&self, listener: Arc<dyn EngineListener>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PendingListener { id, listener });
        id
    }

    /// Drains every pending listener and delivers `status` to them in one job.
    ///
    /// Returns how many listeners were drained.
    pub(crate) fn notify_all(&self, status: EngineInitStatus, message: Option<String>) -> usize {
        let batch = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        let n = batch.len();
        if n == 0 {
            return 0;
        }

        self.affinity.post(Box::new(move || {
            for p in batch {
                invoke_engine_listener(p.id, &p.listener, status, message.as_deref());
            }
        }));
        n
    }

    /// Delivers `status` to a single listener without registering it.
    pub(crate) fn deliver(
        &self,
        listener: Arc<dyn EngineListener>,
        status: EngineInitStatus,
        message: Option<String>,
    ) {
        self.affinity.post(Box::new(move || {
            invoke_engine_listener(0, &listener, status, message.as_deref());
        }));
    }

    /// Delivers a module load outcome.
    pub(crate) fn deliver_module(
        &self,
        listener: Arc<dyn ModuleListener>,
        status: ModuleLoadStatus,
        message: Option<String>,
    ) {
        self.affinity
            .post(Box::new(move || listener.on_load_completed(status, message.as_deref())));
    }

    /// Delivers the first-view notification.
    pub(crate) fn deliver_first_view(&self, listener: Arc<dyn ModuleListener>) {
        self.affinity.post(Box::new(move || listener.on_first_view_added()));
    }

    /// Invokes a `destroy_module` callback.
    pub(crate) fn deliver_destroyed(&self, callback: DestroyModuleCallback, destroyed: bool) {
        self.affinity.post(Box::new(move || callback(destroyed)));
    }

    /// Runs an arbitrary job on the affinity context.
    pub(crate) fn post(&self, job: impl FnOnce() + Send + 'static) {
        self.affinity.post(Box::new(job));
    }

    /// Number of pending listeners.
    pub(crate) fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn invoke_engine_listener(
    id: u64,
    listener: &Arc<dyn EngineListener>,
    status: EngineInitStatus,
    message: Option<&str>,
) {
    let run = AssertUnwindSafe(|| listener.on_initialized(status, message));
    if let Err(panic_err) = catch_unwind(run) {
        tracing::error!(listener = id, info = %panic_message(&*panic_err), "engine listener panicked");
    }
}
