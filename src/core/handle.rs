//! # Engine handle.
//!
//! [`Engine`] is the cheap, cloneable front of one engine. Every mutating call
//! enqueues a command for the controller loop and returns immediately; outcomes
//! arrive through listeners (on the affinity context), the state watch, or the
//! event bus.
//!
//! ## Rules
//! - Calls never block and never run listener code on the caller's stack.
//! - Calls made from one thread are processed in call order.
//! - `Err(ControlError::Closed)` means the controller loop is gone.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::affinity::{self, Affinity};
use crate::capabilities::RootId;
use crate::config::EngineConfig;
use crate::core::builder::EngineBuilder;
use crate::core::command::Command;
use crate::core::roots::RootBindings;
use crate::core::state::EngineState;
use crate::error::{ControlError, ScriptError};
use crate::events::{Bus, Event};
use crate::listeners::{EngineLifecycleListener, EngineListener, ModuleListener};
use crate::module::ModuleLoadRequest;

/// Handle to one engine instance.
#[derive(Clone)]
pub struct Engine {
    pub(crate) tx: mpsc::UnboundedSender<Command>,
    pub(crate) state: watch::Receiver<EngineState>,
    pub(crate) roots: RootBindings,
    pub(crate) affinity: Arc<dyn Affinity>,
    pub(crate) bus: Bus,
    pub(crate) cfg: Arc<EngineConfig>,
}

impl Engine {
    /// Starts building an engine with `cfg`.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    fn send(&self, cmd: Command) -> Result<(), ControlError> {
        self.tx.send(cmd).map_err(|_| ControlError::Closed)
    }

    // === Lifecycle ===

    /// Starts initialization, or registers `listener` for its outcome.
    ///
    /// - `Uninit`: begins the first attempt.
    /// - `Initing`/`Restarting`: registers the listener only.
    /// - `Ready`/`Errored`: delivers the settled outcome to the listener.
    /// - `Destroyed`: delivers `wrong_state`.
    pub fn start(&self, listener: Option<Arc<dyn EngineListener>>) -> Result<(), ControlError> {
        self.send(Command::Start { listener })
    }

    /// Developer reload: tears the bridge down and restarts on a fresh one.
    ///
    /// In debug mode the render tree survives the reload.
    pub fn reload(&self) -> Result<(), ControlError> {
        self.send(Command::Reload)
    }

    /// Replaces the runtime context and initializes again.
    ///
    /// `preserve_render_tree` is honored in debug mode only.
    pub fn restart(&self, preserve_render_tree: bool) -> Result<(), ControlError> {
        self.send(Command::Restart {
            preserve_render_tree,
        })
    }

    /// Tears the engine down. Idempotent.
    pub fn destroy(&self) -> Result<(), ControlError> {
        self.send(Command::Destroy)
    }

    // === Modules ===

    /// Loads a module onto a new root surface.
    pub fn load_module(
        &self,
        request: ModuleLoadRequest,
        listener: Option<Arc<dyn ModuleListener>>,
    ) -> Result<(), ControlError> {
        self.send(Command::LoadModule { request, listener })
    }

    /// Asks the script side to destroy the instance on `root`.
    ///
    /// `on_destroyed(true)` runs once the instance is confirmed gone;
    /// `on_destroyed(false)` if `root` is not bound or the request was superseded.
    pub fn destroy_module(
        &self,
        root: RootId,
        on_destroyed: impl FnOnce(bool) + Send + 'static,
    ) -> Result<(), ControlError> {
        self.send(Command::DestroyModule {
            root,
            callback: Box::new(on_destroyed),
        })
    }

    /// Confirms that the instance on `root` has been destroyed.
    pub fn on_instance_destroy(&self, root: RootId) -> Result<(), ControlError> {
        self.send(Command::InstanceDestroyed { root })
    }

    /// Reports that the first view of the current module was rendered.
    pub fn on_first_view_added(&self) -> Result<(), ControlError> {
        self.send(Command::FirstViewAdded)
    }

    /// Bound root ids, ascending.
    pub fn roots(&self) -> Vec<RootId> {
        self.roots.ids()
    }

    // === Host forwarding ===

    pub fn on_engine_pause(&self) -> Result<(), ControlError> {
        self.send(Command::Pause)
    }

    pub fn on_engine_resume(&self) -> Result<(), ControlError> {
        self.send(Command::Resume)
    }

    /// Registers a pause/resume listener. Listeners are dropped on destroy.
    pub fn add_lifecycle_listener(&self, listener: Arc<dyn EngineLifecycleListener>) -> Result<(), ControlError> {
        self.send(Command::AddLifecycleListener(listener))
    }

    /// Reports an exception raised by the running application.
    pub fn handle_script_exception(&self, err: ScriptError) -> Result<(), ControlError> {
        self.send(Command::ScriptException(err))
    }

    /// Reports that the development server could not serve the core bundle.
    pub fn report_dev_server_error(&self, reason: impl Into<String>) -> Result<(), ControlError> {
        self.send(Command::DevServerError {
            reason: reason.into(),
        })
    }

    /// Dispatches a host event into the script runtime (dropped unless `Ready`).
    pub fn send_event(&self, name: impl Into<String>, params: Value) -> Result<(), ControlError> {
        self.send(Command::SendEvent {
            name: name.into(),
            params,
        })
    }

    // === Observation ===

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe_state(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    /// Waits until the state satisfies `pred` and returns it.
    pub async fn wait_for(
        &self,
        mut pred: impl FnMut(EngineState) -> bool,
    ) -> Result<EngineState, ControlError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|s| pred(*s))
            .await
            .map_err(|_| ControlError::Closed)?;
        Ok(*state)
    }

    /// Receiver for engine events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Resolves once every command sent so far has been processed and every
    /// listener callback it produced has run on the affinity context.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.send(Command::Flush(tx)).is_err() || rx.await.is_err() {
            affinity::flush(self.affinity.as_ref()).await;
        }
    }

    pub fn is_debug_mode(&self) -> bool {
        self.cfg.debug_mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }
}
