//! # Controller intake.
//!
//! Every public operation and every asynchronous completion becomes a
//! [`Command`] on one unbounded queue, drained sequentially by the controller
//! loop. Completion callbacks carry the attempt id they were issued for.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::capabilities::{BundleCallback, DestroyCallback, InitCallback, RootId};
use crate::error::{EngineError, ScriptError};
use crate::listeners::{DestroyModuleCallback, EngineLifecycleListener, EngineListener, ModuleListener};
use crate::module::ModuleLoadRequest;

pub(crate) enum Command {
    // Host operations.
    Start {
        listener: Option<Arc<dyn EngineListener>>,
    },
    Reload,
    Restart {
        preserve_render_tree: bool,
    },
    Destroy,
    LoadModule {
        request: ModuleLoadRequest,
        listener: Option<Arc<dyn ModuleListener>>,
    },
    DestroyModule {
        root: RootId,
        callback: DestroyModuleCallback,
    },
    InstanceDestroyed {
        root: RootId,
    },
    Pause,
    Resume,
    FirstViewAdded,
    AddLifecycleListener(Arc<dyn EngineLifecycleListener>),
    ScriptException(ScriptError),
    DevServerError {
        reason: String,
    },
    SendEvent {
        name: String,
        params: Value,
    },
    /// Resolves after every job posted so far has run on the affinity context.
    Flush(oneshot::Sender<()>),

    // Completions.
    BridgeReady {
        attempt: u64,
        result: Result<(), EngineError>,
    },
    BridgeDestroyed {
        attempt: u64,
        is_reload: bool,
    },
    BundleExecuted {
        attempt: u64,
        root: RootId,
        result: Result<(), EngineError>,
    },
    InitTimeout {
        attempt: u64,
        timeout: Duration,
    },
}

impl Command {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Reload => "reload",
            Command::Restart { .. } => "restart",
            Command::Destroy => "destroy",
            Command::LoadModule { .. } => "load_module",
            Command::DestroyModule { .. } => "destroy_module",
            Command::InstanceDestroyed { .. } => "instance_destroyed",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::FirstViewAdded => "first_view_added",
            Command::AddLifecycleListener(_) => "add_lifecycle_listener",
            Command::ScriptException(_) => "script_exception",
            Command::DevServerError { .. } => "dev_server_error",
            Command::SendEvent { .. } => "send_event",
            Command::Flush(_) => "flush",
            Command::BridgeReady { .. } => "bridge_ready",
            Command::BridgeDestroyed { .. } => "bridge_destroyed",
            Command::BundleExecuted { .. } => "bundle_executed",
            Command::InitTimeout { .. } => "init_timeout",
        }
    }
}

/// Weak reference to the controller queue used to mint completion callbacks.
///
/// The loop itself must not keep the queue open, otherwise it would never
/// observe that every handle is gone.
#[derive(Clone)]
pub(crate) struct Intake {
    tx: mpsc::WeakUnboundedSender<Command>,
}

impl Intake {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<Command>) -> Self {
        Self { tx: tx.downgrade() }
    }

    pub(crate) fn sender(&self) -> Option<mpsc::UnboundedSender<Command>> {
        self.tx.upgrade()
    }

    pub(crate) fn init_callback(&self, attempt: u64) -> Option<InitCallback> {
        let tx = self.sender()?;
        Some(Box::new(move |result| {
            let _ = tx.send(Command::BridgeReady { attempt, result });
        }))
    }

    pub(crate) fn destroy_callback(&self, attempt: u64, is_reload: bool) -> Option<DestroyCallback> {
        let tx = self.sender()?;
        Some(Box::new(move || {
            let _ = tx.send(Command::BridgeDestroyed { attempt, is_reload });
        }))
    }

    pub(crate) fn bundle_callback(&self, attempt: u64, root: RootId) -> Option<BundleCallback> {
        let tx = self.sender()?;
        Some(Box::new(move |result| {
            let _ = tx.send(Command::BundleExecuted {
                attempt,
                root,
                result,
            });
        }))
    }
}
