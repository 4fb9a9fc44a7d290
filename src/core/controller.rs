//! # Engine controller loop.
//!
//! The controller owns every piece of mutable engine state and processes
//! [`Command`]s one at a time. Host calls and bridge completions arrive on the
//! same queue, so no two transitions ever interleave.
//!
//! ```text
//! Engine handle ──┐
//! bridge cb     ──┼──► [intake] ──► EngineController::handle(cmd)
//! watchdog      ──┘                    │
//!                                      ├─► StateCell (watch)      ──► Engine::state()
//!                                      ├─► ListenerRegistry       ──► affinity ──► listeners
//!                                      └─► Bus                    ──► subscribers
//! ```
//!
//! ## Rules
//! - A completion is acted on only if the engine is not destroyed, no teardown
//!   is pending, its attempt id is the current one and no reload is replacing it.
//!   Otherwise it is dropped and reported as `StaleCompletionDropped`.
//! - `Destroyed` is committed before the context is disposed.
//! - On restart success `Ready` is committed before bound modules are loaded
//!   again and before listeners are notified.
//! - Pending listeners still waiting at teardown receive `wrong_state`.
//! - Instance teardown confirmed for a root unmounted by a reload keeps the
//!   binding, unless a `destroy_module` request is waiting on that root.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::capabilities::{ExceptionHandler, RenderSurfaceFactory, RenderTree, RootId, RuntimeFactory};
use crate::config::EngineConfig;
use crate::core::command::{Command, Intake};
use crate::core::context::RuntimeContext;
use crate::core::restart::{RestartCoordinator, RestartTrigger};
use crate::core::roots::RootBindings;
use crate::core::sequencer::{LoadOutcome, ModuleLoadSequencer};
use crate::core::state::{EngineState, StateCell};
use crate::core::watchdog::Watchdog;
use crate::error::{EngineError, ScriptError};
use crate::events::{Bus, Event, EventKind};
use crate::listeners::{
    DestroyModuleCallback, EngineLifecycleListener, EngineListener, ListenerRegistry, ModuleListener,
};
use crate::module::ModuleLoadRequest;
use crate::status::{EngineInitStatus, ModuleLoadStatus};

/// Collaborators handed to the controller by the builder.
pub(crate) struct ControllerParts {
    pub(crate) cfg: Arc<EngineConfig>,
    pub(crate) state: StateCell,
    pub(crate) factory: Arc<dyn RuntimeFactory>,
    pub(crate) surfaces: Arc<dyn RenderSurfaceFactory>,
    pub(crate) exceptions: Option<Arc<dyn ExceptionHandler>>,
    pub(crate) listeners: ListenerRegistry,
    pub(crate) roots: RootBindings,
    pub(crate) intake: Intake,
    pub(crate) bus: Bus,
    /// Cancelled once the loop has exited.
    pub(crate) stopped: CancellationToken,
}

pub(crate) struct EngineController {
    cfg: Arc<EngineConfig>,
    state: StateCell,
    attempt: u64,
    context: Option<RuntimeContext>,
    teardown_pending: bool,
    reload_pending: Option<u64>,
    tree_carried: bool,
    last_outcome: Option<(EngineInitStatus, Option<String>)>,

    factory: Arc<dyn RuntimeFactory>,
    surfaces: Arc<dyn RenderSurfaceFactory>,
    exceptions: Option<Arc<dyn ExceptionHandler>>,
    listeners: ListenerRegistry,
    lifecycle: Vec<Arc<dyn EngineLifecycleListener>>,
    module_listener: Option<Arc<dyn ModuleListener>>,
    roots: RootBindings,
    /// Roots whose instance a reload tore down and that stay bound.
    reload_unmounted: BTreeSet<RootId>,

    restarts: RestartCoordinator,
    sequencer: ModuleLoadSequencer,
    watchdog: Watchdog,
    intake: Intake,
    bus: Bus,
    stopped: CancellationToken,
}

impl EngineController {
    pub(crate) fn new(parts: ControllerParts) -> Self {
        let debug_mode = parts.cfg.debug_mode;
        Self {
            cfg: parts.cfg,
            state: parts.state,
            attempt: 0,
            context: None,
            teardown_pending: false,
            reload_pending: None,
            tree_carried: false,
            last_outcome: None,
            factory: parts.factory,
            surfaces: parts.surfaces,
            exceptions: parts.exceptions,
            listeners: parts.listeners,
            lifecycle: Vec::new(),
            module_listener: None,
            roots: parts.roots,
            reload_unmounted: BTreeSet::new(),
            restarts: RestartCoordinator::new(debug_mode),
            sequencer: ModuleLoadSequencer::new(debug_mode),
            watchdog: Watchdog::default(),
            intake: parts.intake,
            bus: parts.bus,
            stopped: parts.stopped,
        }
    }

    /// Drains the intake until every sender is gone.
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            tracing::trace!(command = cmd.as_label(), state = %self.state.get(), "command");
            self.handle(cmd);
        }
        self.on_intake_closed();
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Start { listener } => self.on_start(listener),
            Command::Reload => self.on_reload(),
            Command::Restart {
                preserve_render_tree,
            } => self.restart(RestartTrigger::Recovery {
                preserve_render_tree,
            }),
            Command::Destroy => self.on_destroy(),
            Command::LoadModule { request, listener } => self.on_load_module(request, listener),
            Command::DestroyModule { root, callback } => self.on_destroy_module(root, callback),
            Command::InstanceDestroyed { root } => self.on_instance_destroyed(root),
            Command::Pause => self.on_pause(),
            Command::Resume => self.on_resume(),
            Command::FirstViewAdded => self.on_first_view_added(),
            Command::AddLifecycleListener(listener) => {
                if !self.state.get().is_terminal() {
                    self.lifecycle.push(listener);
                }
            }
            Command::ScriptException(err) => self.on_script_exception(err),
            Command::DevServerError { reason } => self.on_dev_server_error(reason),
            Command::SendEvent { name, params } => self.on_send_event(&name, &params),
            Command::Flush(done) => self.listeners.post(move || {
                let _ = done.send(());
            }),
            Command::BridgeReady { attempt, result } => self.on_bridge_ready(attempt, result),
            Command::BridgeDestroyed { attempt, is_reload } => {
                self.on_bridge_destroyed(attempt, is_reload)
            }
            Command::BundleExecuted {
                attempt,
                root,
                result,
            } => self.on_bundle_executed(attempt, root, result),
            Command::InitTimeout { attempt, timeout } => {
                if let Some(reason) = self.stale_reason(attempt) {
                    self.drop_stale(attempt, "init timeout", reason);
                    return;
                }
                if !self.state.get().is_in_flight() {
                    return;
                }
                self.bus.publish(
                    Event::new(EventKind::InitTimeoutHit)
                        .with_attempt(attempt)
                        .with_timeout(timeout),
                );
                let err = EngineError::Timeout { timeout };
                self.settle_errored(err.status(), err.as_message());
            }
        }
    }

    // === Initialization ===

    fn on_start(&mut self, listener: Option<Arc<dyn EngineListener>>) {
        let state = self.state.get();
        if self.teardown_pending {
            self.reject_listener(listener, "start", state);
            return;
        }
        match state {
            EngineState::Uninit => {
                if let Some(l) = listener {
                    self.listeners.register(l);
                }
                if self.state.transition(&[EngineState::Uninit], EngineState::Initing).is_ok() {
                    self.begin_attempt(None);
                }
            }
            EngineState::Initing | EngineState::Restarting => {
                if let Some(l) = listener {
                    self.listeners.register(l);
                }
            }
            EngineState::Ready | EngineState::Errored => {
                if let Some(l) = listener {
                    let (status, message) = self
                        .last_outcome
                        .clone()
                        .unwrap_or((EngineInitStatus::WrongState, None));
                    self.listeners.deliver(l, status, message);
                }
            }
            EngineState::Destroyed => self.reject_listener(listener, "start", state),
        }
    }

    fn reject_listener(
        &self,
        listener: Option<Arc<dyn EngineListener>>,
        operation: &'static str,
        state: EngineState,
    ) {
        tracing::warn!(operation, %state, "rejected");
        if let Some(l) = listener {
            let err = EngineError::WrongState { operation, state };
            self.listeners.deliver(l, err.status(), Some(err.as_message()));
        }
    }

    /// Builds a context for a new attempt and asks its bridge to initialize.
    fn begin_attempt(&mut self, carried: Option<Box<dyn RenderTree>>) {
        self.attempt += 1;
        let attempt = self.attempt;
        let state = self.state.get();
        tracing::info!(attempt, %state, debug_mode = self.cfg.debug_mode, "initialization attempt starting");
        self.bus.publish(Event::new(EventKind::InitStarting).with_attempt(attempt).with_state(state));

        let mut ctx = match RuntimeContext::build(self.factory.as_ref(), &self.cfg, attempt, carried) {
            Ok(ctx) => ctx,
            Err(err) => {
                self.settle_errored(EngineInitStatus::InitException, err.as_message());
                return;
            }
        };
        let Some(on_complete) = self.intake.init_callback(attempt) else {
            tracing::debug!(attempt, "intake closed, abandoning attempt");
            ctx.dispose(false);
            return;
        };

        if let Some(timeout) = self.cfg.init_timeout() {
            self.watchdog.arm(attempt, timeout, &self.intake);
        }
        ctx.bridge().initialize(on_complete);
        self.context = Some(ctx);
    }

    fn on_bridge_ready(&mut self, attempt: u64, result: Result<(), EngineError>) {
        if let Some(reason) = self.stale_reason(attempt) {
            self.drop_stale(attempt, "bridge ready", reason);
            return;
        }
        let state = self.state.get();
        if !state.is_in_flight() {
            self.drop_stale(attempt, "bridge ready", "engine not initializing");
            self.listeners.notify_all(
                EngineInitStatus::WrongState,
                Some(format!("initialization completed in state {state}")),
            );
            return;
        }
        match result {
            Ok(()) => self.settle_ready(EngineInitStatus::Ok, None),
            Err(err) => self.settle_errored(err.status(), err.as_message()),
        }
    }

    fn on_dev_server_error(&mut self, reason: String) {
        self.bus.publish(Event::new(EventKind::DevServerError).with_reason(reason.as_str()));
        if !self.cfg.debug_mode {
            tracing::warn!(%reason, "dev server error outside debug mode ignored");
            return;
        }
        let state = self.state.get();
        if self.teardown_pending || self.reload_pending.is_some() || !state.is_in_flight() {
            tracing::debug!(%state, %reason, "dev server error outside initialization ignored");
            return;
        }
        let err = EngineError::DevServer { reason };
        self.settle_ready(err.status(), Some(err.as_message()));
    }

    /// Commits `Ready` and notifies pending listeners with `status`.
    fn settle_ready(&mut self, status: EngineInitStatus, message: Option<String>) {
        self.watchdog.disarm();
        let prev = match self.state.transition(&[EngineState::Initing, EngineState::Restarting], EngineState::Ready) {
            Ok(prev) => prev,
            Err(cur) => {
                tracing::warn!(state = %cur, "cannot commit ready");
                return;
            }
        };
        tracing::info!(attempt = self.attempt, status = status.as_label(), "engine ready");
        self.bus.publish(
            Event::new(EventKind::EngineReady)
                .with_attempt(self.attempt)
                .with_status(status.as_label()),
        );

        if status == EngineInitStatus::Ok {
            if prev == EngineState::Restarting {
                self.reload_bound_modules();
            }
            self.run_preload();
        }
        self.settle(status, message);
    }

    /// Commits `Errored` and notifies pending listeners with `status`.
    fn settle_errored(&mut self, status: EngineInitStatus, message: String) {
        self.watchdog.disarm();
        if let Err(cur) = self
            .state
            .transition(&[EngineState::Initing, EngineState::Restarting], EngineState::Errored)
        {
            tracing::warn!(state = %cur, "cannot commit errored");
            return;
        }
        tracing::error!(attempt = self.attempt, status = status.as_label(), reason = %message, "initialization failed");
        self.bus.publish(
            Event::new(EventKind::EngineErrored)
                .with_attempt(self.attempt)
                .with_status(status.as_label())
                .with_reason(message.as_str()),
        );
        self.settle(status, Some(message));
    }

    fn settle(&mut self, status: EngineInitStatus, message: Option<String>) {
        self.last_outcome = Some((status, message.clone()));
        let n = self.listeners.notify_all(status, message);
        tracing::debug!(listeners = n, status = status.as_label(), "init listeners notified");
    }

    fn run_preload(&mut self) {
        let Some(source) = self.cfg.preload_bundle.as_ref() else {
            return;
        };
        if let Some(ctx) = self.context.as_mut() {
            tracing::debug!(path = %source.path(), "running preload bundle");
            self.sequencer.preload(ctx, source);
        }
    }

    // === Stale completions ===

    fn stale_reason(&self, attempt: u64) -> Option<&'static str> {
        if self.state.get().is_terminal() {
            Some("engine destroyed")
        } else if self.teardown_pending {
            Some("teardown in progress")
        } else if attempt != self.attempt {
            Some("superseded attempt")
        } else if self.reload_pending == Some(attempt) {
            Some("attempt is being reloaded")
        } else {
            None
        }
    }

    fn drop_stale(&self, attempt: u64, what: &'static str, reason: &'static str) {
        let state = self.state.get();
        tracing::debug!(attempt, current = self.attempt, %state, what, reason, "dropping stale completion");
        self.bus.publish(
            Event::new(EventKind::StaleCompletionDropped)
                .with_attempt(attempt)
                .with_state(state)
                .with_reason(format!("{what}: {reason}")),
        );
    }

    // === Reload / restart ===

    fn on_reload(&mut self) {
        let state = self.state.get();
        if state.is_terminal() || self.teardown_pending {
            tracing::warn!(%state, "reload rejected");
            return;
        }
        if self.reload_pending.is_some() {
            tracing::debug!("reload already in progress");
            return;
        }
        if state == EngineState::Uninit {
            tracing::warn!("reload before start ignored");
            return;
        }
        self.bus.publish(Event::new(EventKind::ReloadRequested).with_state(state));

        if self.context.is_none() {
            self.restart(RestartTrigger::DevReload);
            return;
        }
        let attempt = self.attempt;
        let Some(on_destroyed) = self.intake.destroy_callback(attempt, true) else {
            return;
        };
        if state != EngineState::Initing {
            let _ = self
                .state
                .transition(&[EngineState::Ready, EngineState::Errored], EngineState::Restarting);
        }
        self.watchdog.disarm();
        self.reload_pending = Some(attempt);

        let roots = self.roots.ids();
        self.reload_unmounted = roots.iter().copied().collect();
        if let Some(ctx) = self.context.as_mut() {
            for root in roots {
                ctx.bridge().destroy_instance(root);
            }
            ctx.bridge().destroy(true, on_destroyed);
        }
    }

    fn on_bridge_destroyed(&mut self, attempt: u64, is_reload: bool) {
        if self.state.get().is_terminal() {
            tracing::trace!(attempt, "bridge destroyed after teardown");
            return;
        }
        if self.teardown_pending {
            self.finalize_destroy();
            return;
        }
        if !is_reload || self.reload_pending != Some(attempt) {
            self.drop_stale(attempt, "bridge destroyed", "no reload pending for this attempt");
            return;
        }
        self.reload_pending = None;
        self.restart(RestartTrigger::DevReload);
    }

    fn restart(&mut self, trigger: RestartTrigger) {
        let state = self.state.get();
        if state.is_terminal() || self.teardown_pending {
            tracing::warn!(%state, trigger = trigger.as_label(), "restart rejected");
            let err = EngineError::WrongState {
                operation: "restart",
                state,
            };
            self.listeners.notify_all(err.status(), Some(err.as_message()));
            return;
        }
        self.reload_pending = None;
        if state != EngineState::Initing {
            let _ = self.state.transition(
                &[EngineState::Uninit, EngineState::Ready, EngineState::Errored, EngineState::Restarting],
                EngineState::Restarting,
            );
        }

        let plan = self.restarts.plan(trigger);
        tracing::info!(
            attempt = self.attempt,
            trigger = trigger.as_label(),
            preserve_render_tree = plan.preserve_render_tree,
            "restarting engine"
        );
        self.bus.publish(
            Event::new(EventKind::RestartStarting)
                .with_attempt(self.attempt)
                .with_reason(plan.trigger.as_label()),
        );

        self.watchdog.disarm();
        let had_context = self.context.is_some();
        let carried = self.restarts.hand_off(self.context.take(), &plan);
        self.tree_carried = carried.is_some();
        if had_context {
            let kind = if self.tree_carried {
                EventKind::RenderTreeCarried
            } else {
                EventKind::RenderTreeDiscarded
            };
            self.bus.publish(Event::new(kind).with_attempt(self.attempt));
        }
        self.begin_attempt(carried);
    }

    fn reload_bound_modules(&mut self) {
        let entries = self.roots.reload_entries();
        if entries.is_empty() {
            return;
        }
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        tracing::debug!(roots = entries.len(), "loading bound modules again");

        let attempt = self.attempt;
        let intake = self.intake.clone();
        let on_bundle = move |root| intake.bundle_callback(attempt, root);
        let outcomes = self
            .sequencer
            .reload_bound(ctx, entries, !self.tree_carried, &on_bundle);
        for (listener, outcome) in outcomes {
            self.report_load(listener, outcome);
        }
    }

    // === Teardown ===

    fn on_destroy(&mut self) {
        if self.state.get().is_terminal() || self.teardown_pending {
            tracing::debug!("destroy already requested");
            return;
        }
        tracing::info!(state = %self.state.get(), "destroy requested");
        self.bus.publish(Event::new(EventKind::DestroyRequested).with_state(self.state.get()));
        self.watchdog.disarm();

        if self.context.is_none() {
            self.finalize_destroy();
            return;
        }
        // A reload already asked the bridge to tear down; its completion finishes the job.
        if self.reload_pending.take().is_some() {
            self.teardown_pending = true;
            return;
        }
        let Some(on_destroyed) = self.intake.destroy_callback(self.attempt, false) else {
            self.finalize_destroy();
            return;
        };
        self.teardown_pending = true;
        if let Some(ctx) = self.context.as_mut() {
            ctx.bridge().destroy(false, on_destroyed);
        }
    }

    fn finalize_destroy(&mut self) {
        self.teardown_pending = false;
        self.reload_pending = None;
        self.watchdog.disarm();

        let prev = match self.state.transition(EngineState::LIVE, EngineState::Destroyed) {
            Ok(prev) => prev,
            Err(_) => return,
        };
        if let Some(ctx) = self.context.take() {
            ctx.dispose(false);
        }
        let roots = self.roots.clear();
        self.reload_unmounted.clear();
        let drained = self
            .listeners
            .notify_all(EngineInitStatus::WrongState, Some("engine destroyed".to_string()));
        self.lifecycle.clear();
        self.module_listener = None;
        self.last_outcome = None;

        tracing::info!(from = %prev, roots, drained, "engine destroyed");
        self.bus.publish(Event::new(EventKind::EngineDestroyed).with_state(prev));
    }

    fn on_intake_closed(mut self) {
        self.watchdog.disarm();
        if let Some(ctx) = self.context.take() {
            ctx.dispose(false);
        }
        self.listeners
            .notify_all(EngineInitStatus::WrongState, Some("engine dropped".to_string()));
        tracing::debug!(state = %self.state.get(), "controller loop exiting");
        self.stopped.cancel();
    }

    // === Modules ===

    fn on_load_module(&mut self, request: ModuleLoadRequest, listener: Option<Arc<dyn ModuleListener>>) {
        if let Some(l) = &listener {
            self.module_listener = Some(Arc::clone(l));
        }
        self.bus
            .publish(Event::new(EventKind::ModuleLoadStarting).with_reason(request.component_name()));

        let ready = self.state.get() == EngineState::Ready && !self.teardown_pending;
        let attempt = self.attempt;
        let intake = self.intake.clone();
        let on_bundle = move |root| intake.bundle_callback(attempt, root);
        let outcome = self.sequencer.load(
            ready,
            self.context.as_mut(),
            self.surfaces.as_ref(),
            &self.roots,
            request,
            listener.clone(),
            &on_bundle,
        );
        self.report_load(listener, outcome);
    }

    fn on_bundle_executed(&mut self, attempt: u64, root: RootId, result: Result<(), EngineError>) {
        if let Some(reason) = self.stale_reason(attempt) {
            self.drop_stale(attempt, "bundle executed", reason);
            return;
        }
        let (status, message) = match result {
            Ok(()) => (ModuleLoadStatus::Ok, None),
            Err(err) => (ModuleLoadStatus::Failed, Some(err.as_message())),
        };
        let outcome = LoadOutcome::Completed {
            root: Some(root),
            status,
            message,
        };
        self.report_load(self.roots.listener(root), outcome);
    }

    fn report_load(&mut self, listener: Option<Arc<dyn ModuleListener>>, outcome: LoadOutcome) {
        let (root, status, message) = match outcome {
            LoadOutcome::Pending { root } => {
                tracing::debug!(%root, "root bound, waiting for bundle");
                self.bus.publish(Event::new(EventKind::RootBound).with_root(root));
                return;
            }
            LoadOutcome::Completed {
                root,
                status,
                message,
            } => (root, status, message),
        };

        let mut ev = if status == ModuleLoadStatus::Ok {
            Event::new(EventKind::ModuleLoaded)
        } else {
            tracing::warn!(root = ?root, status = status.as_label(), reason = ?message, "module load failed");
            Event::new(EventKind::ModuleLoadFailed).with_status(status.as_label())
        };
        if let Some(root) = root {
            ev = ev.with_root(root);
        }
        if let Some(m) = &message {
            ev = ev.with_reason(m.as_str());
        }
        self.bus.publish(ev);

        if let Some(l) = listener {
            self.listeners.deliver_module(l, status, message);
        }
    }

    fn on_destroy_module(&mut self, root: RootId, callback: DestroyModuleCallback) {
        if self.state.get().is_terminal() {
            self.listeners.deliver_destroyed(callback, false);
            return;
        }
        match self.roots.set_on_destroyed(root, callback) {
            Err(callback) => {
                tracing::warn!(%root, "destroy_module for unbound root");
                self.listeners.deliver_destroyed(callback, false);
            }
            Ok(replaced) => {
                if let Some(prev) = replaced {
                    self.listeners.deliver_destroyed(prev, false);
                }
                if self.context.is_none() {
                    self.on_instance_destroyed(root);
                } else if let Some(ctx) = self.context.as_mut() {
                    ctx.bridge().destroy_instance(root);
                }
            }
        }
    }

    fn on_instance_destroyed(&mut self, root: RootId) {
        if self.state.get().is_terminal() {
            return;
        }
        if self.reload_unmounted.remove(&root) && !self.roots.destroy_requested(root) {
            tracing::debug!(%root, "instance destroyed by reload, binding kept");
            return;
        }
        let Some(binding) = self.roots.unbind(root) else {
            tracing::debug!(%root, "instance destroyed for unbound root");
            return;
        };
        if let Some(ctx) = self.context.as_mut() {
            ctx.render_tree().destroy_root(root);
        }
        if let Some(cb) = binding.on_destroyed {
            self.listeners.deliver_destroyed(cb, true);
        }
        self.bus.publish(Event::new(EventKind::RootUnbound).with_root(root));
    }

    fn on_first_view_added(&mut self) {
        if let Some(l) = self.module_listener.clone() {
            self.listeners.deliver_first_view(l);
        }
    }

    // === Host forwarding ===

    fn on_pause(&mut self) {
        if self.state.get().is_terminal() {
            return;
        }
        self.notify_lifecycle(|l| l.on_engine_pause());
        let roots = self.roots.ids();
        if let Some(ctx) = self.context.as_mut() {
            ctx.render_tree().on_pause();
            for root in roots {
                ctx.bridge().pause_instance(root);
            }
        }
        self.bus.publish(Event::new(EventKind::EnginePaused));
    }

    fn on_resume(&mut self) {
        if self.state.get().is_terminal() {
            return;
        }
        self.notify_lifecycle(|l| l.on_engine_resume());
        let roots = self.roots.ids();
        if let Some(ctx) = self.context.as_mut() {
            ctx.render_tree().on_resume();
            for root in roots {
                ctx.bridge().resume_instance(root);
            }
        }
        self.bus.publish(Event::new(EventKind::EngineResumed));
    }

    fn notify_lifecycle(&self, f: fn(&dyn EngineLifecycleListener)) {
        if self.lifecycle.is_empty() {
            return;
        }
        let listeners = self.lifecycle.clone();
        self.listeners.post(move || {
            for l in &listeners {
                f(l.as_ref());
            }
        });
    }

    fn on_script_exception(&mut self, err: ScriptError) {
        if self.state.get().is_terminal() {
            return;
        }
        tracing::warn!(message = %err.message, "script exception");
        self.bus
            .publish(Event::new(EventKind::ScriptException).with_reason(Arc::clone(&err.message)));

        if let Some(handler) = self.exceptions.clone() {
            let forwarded = err.clone();
            self.listeners.post(move || handler.handle_script_exception(&forwarded));
        }
        if !self.cfg.debug_mode {
            if let Some(ctx) = self.context.as_mut() {
                ctx.bridge().notify_js_exception(&err);
            }
        }
    }

    fn on_send_event(&mut self, name: &str, params: &Value) {
        if self.state.get() != EngineState::Ready || self.teardown_pending {
            tracing::debug!(event = name, state = %self.state.get(), "event dropped, engine not ready");
            return;
        }
        if let Some(ctx) = self.context.as_mut() {
            ctx.bridge().send_event(name, params);
        }
    }
}
