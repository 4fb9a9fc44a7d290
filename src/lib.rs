//! # enginevisor
//!
//! **Enginevisor** is a lifecycle controller for an embedded script runtime.
//!
//! It drives a script bridge and its subsystems through asynchronous
//! initialization, developer reload, recovery restart and teardown, and
//! sequences module loads against whichever runtime context is current.
//! Completions from superseded attempts are recognized and dropped, so a late
//! callback can never resurrect a destroyed or replaced engine.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   host thread(s)                         bridge thread(s)
//!   Engine::start / reload / load_module   InitCallback / DestroyCallback / BundleCallback
//!          │                                        │ (tagged with attempt id)
//!          ▼                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 intake (unbounded mpsc of Command)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EngineController (one loop, owns every transition)               │
//! │  - StateCell (watch)          Uninit → Initing → Ready/Errored    │
//! │  - RuntimeContext             bridge, render tree, modules, ...   │
//! │  - RestartCoordinator         which subsystems survive a restart  │
//! │  - ModuleLoadSequencer        surface → root → bundle → instance  │
//! │  - RootBindings               what to load again after restart    │
//! │  - Watchdog                   per-attempt init timeout            │
//! └──────┬─────────────────────────────┬──────────────────────────────┘
//!        │ post(job)                   │ publish(Event)
//!        ▼                             ▼
//! ┌────────────────────┐   ┌────────────────────────────┐
//! │ ListenerRegistry   │   │ Bus (broadcast channel)    │
//! │   └─► Affinity     │   │   └─► SubscriberSet        │
//! │       (one thread) │   │        ├─► worker ─► sub 1 │
//! │   └─► listeners    │   │        └─► worker ─► sub N │
//! └────────────────────┘   └────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//!  Uninit ──start──► Initing ──bridge Ok──► Ready ──reload/restart──► Restarting
//!                       │                     ▲                           │
//!                       │                     └───────── bridge Ok ───────┘
//!                       └──fail/timeout──► Errored ──restart──► Restarting
//!
//!  any live state ──destroy──► (teardown pending) ──bridge destroyed──► Destroyed
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Engine**        | Handle to one engine; start, reload, restart, destroy.        | [`Engine`], [`EngineBuilder`], [`EngineState`] |
//! | **Capabilities**  | Host-supplied bridge, subsystems and surfaces.                | [`BridgeGateway`], [`RuntimeFactory`], [`RenderSurfaceFactory`] |
//! | **Modules**       | Load and destroy script modules on root surfaces.             | [`ModuleLoadRequest`], [`ModuleListener`]   |
//! | **Listeners**     | Init outcomes delivered once, on the affinity context.       | [`EngineListener`], [`Affinity`]            |
//! | **Subscriber API**| Observe engine events (logging, metrics, custom).             | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed lifecycle, control and build errors.                    | [`EngineError`], [`ControlError`], [`BuildError`] |
//! | **Configuration** | Centralize engine settings.                                   | [`EngineConfig`]                            |
//! | **Registry**      | Track several engines by id without a global table.           | [`EngineRegistry`], [`EngineId`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use enginevisor::*;
//!
//! struct Bridge;
//! impl BridgeGateway for Bridge {
//!     fn initialize(&mut self, done: InitCallback) { done(Ok(())) }
//!     fn destroy(&mut self, _is_reload: bool, done: DestroyCallback) { done() }
//!     fn run_bundle(&mut self, _: RootId, _: &BundleSource, done: Option<BundleCallback>) {
//!         if let Some(done) = done { done(Ok(())) }
//!     }
//!     fn load_instance(&mut self, _: &str, _: RootId, _: &InstanceParams) {}
//!     fn notify_js_exception(&mut self, _: &ScriptError) {}
//! }
//!
//! struct Tree;
//! impl RenderTree for Tree {
//!     fn create_root(&mut self, _: &RenderSurface) -> Result<(), EngineError> { Ok(()) }
//!     fn destroy_root(&mut self, _: RootId) {}
//!     fn destroy(self: Box<Self>) {}
//! }
//!
//! struct Plain;
//! impl ModuleRegistry for Plain { fn destroy(self: Box<Self>) {} }
//! impl ResourceManager for Plain { fn destroy(self: Box<Self>) {} }
//!
//! struct Factory;
//! impl RuntimeFactory for Factory {
//!     fn create_resource_manager(&self) -> Result<Box<dyn ResourceManager>, EngineError> { Ok(Box::new(Plain)) }
//!     fn create_module_registry(&self) -> Result<Box<dyn ModuleRegistry>, EngineError> { Ok(Box::new(Plain)) }
//!     fn create_bridge(&self, _: &BridgeParams) -> Result<Box<dyn BridgeGateway>, EngineError> { Ok(Box::new(Bridge)) }
//!     fn create_render_tree(&self) -> Result<Box<dyn RenderTree>, EngineError> { Ok(Box::new(Tree)) }
//! }
//!
//! struct Surfaces;
//! impl RenderSurfaceFactory for Surfaces {
//!     fn create_root_view(&self, host: &HostContext) -> Option<RenderSurface> {
//!         Some(RenderSurface { root_id: RootId(1), host: host.clone() })
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::builder(EngineConfig::default())
//!         .with_runtime_factory(Arc::new(Factory))
//!         .with_surface_factory(Arc::new(Surfaces))
//!         .build()?;
//!
//!     engine.start(Some(EngineListenerFn::arc(|status, _msg| {
//!         println!("engine settled: {status}");
//!     })))?;
//!     engine.wait_for(|s| s.is_settled()).await?;
//!
//!     let request = ModuleLoadRequest::new("App")
//!         .with_host(HostContext::new(()))
//!         .with_source(BundleSource::Asset("app.bundle".into()));
//!     engine.load_module(request, None)?;
//!     engine.flush().await;
//!     assert_eq!(engine.roots(), vec![RootId(1)]);
//!
//!     engine.destroy()?;
//!     engine.wait_for(|s| s.is_terminal()).await?;
//!     Ok(())
//! }
//! ```
mod affinity;
mod capabilities;
mod config;
mod core;
mod error;
mod events;
mod listeners;
mod module;
mod registry;
mod status;
mod subscribers;

// ---- Public re-exports ----

pub use affinity::{Affinity, AffinityThread, Job};
pub use capabilities::{
    BridgeGateway, BridgeParams, BundleCallback, BundleLoader, BundleSource, DestroyCallback,
    ExceptionHandler, HostContext, InitCallback, Inspector, ModuleRegistry, RenderSurface,
    RenderSurfaceFactory, RenderTree, ResourceManager, RootId, RuntimeFactory,
};
pub use config::EngineConfig;
pub use crate::core::{Engine, EngineBuilder, EngineState};
pub use error::{BuildError, ControlError, EngineError, ScriptError};
pub use events::{Bus, Event, EventKind};
pub use listeners::{
    DestroyModuleCallback, EngineLifecycleListener, EngineListener, EngineListenerFn,
    ModuleListener, ModuleListenerFn,
};
pub use module::{InstanceParams, ModuleLoadRequest, SOURCE_PATH_PARAM};
pub use registry::{EngineId, EngineRegistry};
pub use status::{EngineInitStatus, ModuleLoadStatus};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
