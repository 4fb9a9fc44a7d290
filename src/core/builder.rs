use std::sync::Arc;

use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    affinity::{Affinity, AffinityThread},
    capabilities::{ExceptionHandler, RenderSurfaceFactory, RuntimeFactory},
    config::EngineConfig,
    error::BuildError,
    events::Bus,
    listeners::ListenerRegistry,
    subscribers::{Subscribe, SubscriberSet},
};
use super::{
    command::Intake,
    controller::{ControllerParts, EngineController},
    handle::Engine,
    roots::RootBindings,
    state::StateCell,
};

/// Builder for constructing an [`Engine`] from its capabilities.
pub struct EngineBuilder {
    cfg: EngineConfig,
    factory: Option<Arc<dyn RuntimeFactory>>,
    surfaces: Option<Arc<dyn RenderSurfaceFactory>>,
    affinity: Option<Arc<dyn Affinity>>,
    exceptions: Option<Arc<dyn ExceptionHandler>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            factory: None,
            surfaces: None,
            affinity: None,
            exceptions: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the factory that builds each runtime context. Required.
    pub fn with_runtime_factory(mut self, factory: Arc<dyn RuntimeFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Sets the factory that creates root surfaces for module loads. Required.
    pub fn with_surface_factory(mut self, surfaces: Arc<dyn RenderSurfaceFactory>) -> Self {
        self.surfaces = Some(surfaces);
        self
    }

    /// Sets the context listener callbacks run on.
    ///
    /// Defaults to an [`AffinityThread`] named after
    /// [`EngineConfig::affinity_thread_name`].
    pub fn with_affinity(mut self, affinity: Arc<dyn Affinity>) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Sets the handler for exceptions raised by the running application.
    pub fn with_exception_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.exceptions = Some(handler);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive engine events (state changes, stale completions,
    /// module loads) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the engine and spawns its controller loop.
    ///
    /// Must be called from within a Tokio runtime. The engine starts in
    /// `Uninit`; call [`Engine::start`] to begin initialization.
    pub fn build(self) -> Result<Engine, BuildError> {
        let factory = self.factory.ok_or(BuildError::MissingRuntimeFactory)?;
        let surfaces = self.surfaces.ok_or(BuildError::MissingSurfaceFactory)?;
        let affinity: Arc<dyn Affinity> = match self.affinity {
            Some(affinity) => affinity,
            None => AffinityThread::spawn(self.cfg.affinity_thread_name.clone())?,
        };

        let cfg = Arc::new(self.cfg);
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let state = StateCell::new();
        let state_rx = state.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let roots = RootBindings::default();
        let stopped = CancellationToken::new();

        let controller = EngineController::new(ControllerParts {
            cfg: Arc::clone(&cfg),
            state,
            factory,
            surfaces,
            exceptions: self.exceptions,
            listeners: ListenerRegistry::new(Arc::clone(&affinity)),
            roots: roots.clone(),
            intake: Intake::new(&tx),
            bus: bus.clone(),
            stopped: stopped.clone(),
        });

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let mut events = bus.subscribe();
            tokio::spawn(async move {
                loop {
                    // Queued events are drained before honoring the stop signal.
                    let ev = tokio::select! {
                        biased;
                        ev = events.recv() => ev,
                        _ = stopped.cancelled() => break,
                    };
                    match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                set.shutdown().await;
            });
        }
        tokio::spawn(controller.run(rx));

        tracing::debug!(debug_mode = cfg.debug_mode, "engine built");
        Ok(Engine {
            tx,
            state: state_rx,
            roots,
            affinity,
            bus,
            cfg,
        })
    }
}
