//! # Affinity context for listener callbacks.
//!
//! Host listeners expect to run on one designated context (the UI thread in
//! most embeddings). The controller never calls a listener directly: it posts
//! a job to an [`Affinity`] executor, which runs jobs one at a time in FIFO order.
//!
//! ```text
//! controller loop ── post(job) ──► [unbounded queue] ──► affinity thread ──► job()
//!                                                             └─► panic caught, logged
//! ```
//!
//! ## Rules
//! - Jobs posted from one thread run in the order they were posted.
//! - A panicking job is logged and does not stop the executor.
//! - Hosts with their own UI loop implement [`Affinity`] and forward jobs there.

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::subscribers::panic_message;

/// A unit of work posted to the affinity context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executor that runs listener callbacks on a single designated context.
pub trait Affinity: Send + Sync + 'static {
    /// Enqueues `job`. Must not run it inline on the caller's stack.
    fn post(&self, job: Job);
}

/// Default affinity executor: a dedicated named thread.
///
/// The thread exits once every clone of the executor is dropped and the queue is drained.
pub struct AffinityThread {
    tx: mpsc::UnboundedSender<Job>,
    name: String,
}

impl AffinityThread {
    /// Spawns the executor thread.
    pub fn spawn(name: impl Into<String>) -> io::Result<Arc<Self>> {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        thread::Builder::new().name(name.clone()).spawn(move || {
            while let Some(job) = rx.blocking_recv() {
                if let Err(panic_err) = catch_unwind(AssertUnwindSafe(job)) {
                    let info = panic_message(&*panic_err);
                    tracing::error!(%info, "listener panicked on affinity thread");
                }
            }
            tracing::trace!("affinity thread exiting");
        })?;

        Ok(Arc::new(Self { tx, name }))
    }

    /// Thread name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Affinity for AffinityThread {
    fn post(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::warn!(thread = %self.name, "affinity thread gone, job dropped");
        }
    }
}

/// Resolves once every job posted to `affinity` before this call has run.
///
/// Returns `false` if the executor dropped the marker job.
pub(crate) async fn flush(affinity: &dyn Affinity) -> bool {
    let (tx, rx) = oneshot::channel::<()>();
    affinity.post(Box::new(move || {
        let _ = tx.send(());
    }));
    rx.await.is_ok()
}
