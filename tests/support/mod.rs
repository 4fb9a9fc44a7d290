//! Scripted capabilities for integration tests.
//!
//! The fake bridge never completes anything on its own unless told to: init,
//! destroy and bundle callbacks are parked in a shared [`Recorder`] so a test
//! can fire them late, out of order or not at all.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use enginevisor::{
    BridgeGateway, BridgeParams, BundleCallback, BundleSource, DestroyCallback, Engine,
    EngineConfig, EngineError, EngineInitStatus, EngineState, EngineListener, HostContext, InitCallback,
    Inspector, InstanceParams, ModuleListener, ModuleLoadStatus, ModuleRegistry, RenderSurface,
    RenderSurfaceFactory, RenderTree, ResourceManager, RootId, RuntimeFactory, ScriptError,
};
use serde_json::Value;

/// Something a capability was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize { attempt: u64 },
    Destroy { attempt: u64, is_reload: bool },
    RunBundle { attempt: u64, root: RootId, path: String },
    LoadInstance { attempt: u64, component: String, root: RootId },
    DestroyInstance { attempt: u64, root: RootId },
    PauseInstance { root: RootId },
    ResumeInstance { root: RootId },
    SendEvent { name: String },
    NotifyException { message: String },
    TreeCreated { tree: u32 },
    TreeDestroyed { tree: u32 },
    CreateRoot { tree: u32, root: RootId },
    DestroyRoot { tree: u32, root: RootId },
    InspectorDestroyed { is_reload: bool },
}

/// Shared log of calls plus parked completion callbacks.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    inits: Mutex<Vec<(u64, InitCallback)>>,
    destroys: Mutex<Vec<(u64, bool, DestroyCallback)>>,
    bundles: Mutex<Vec<(u64, RootId, BundleCallback)>>,

    /// Complete `initialize` immediately with `Ok`.
    pub auto_init: AtomicBool,
    /// Complete `destroy` immediately.
    pub auto_destroy: AtomicBool,
    /// Fail context construction at the bridge step.
    pub fail_bridge: AtomicBool,
    /// Fail `create_root` on the render tree.
    pub fail_create_root: AtomicBool,

    next_tree: AtomicU32,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// Removes and returns the oldest parked init callback.
    pub fn take_init(&self) -> Option<(u64, InitCallback)> {
        let mut inits = self.inits.lock().unwrap();
        if inits.is_empty() { None } else { Some(inits.remove(0)) }
    }

    pub fn take_destroy(&self) -> Option<(u64, bool, DestroyCallback)> {
        let mut destroys = self.destroys.lock().unwrap();
        if destroys.is_empty() { None } else { Some(destroys.remove(0)) }
    }

    pub fn take_bundle(&self) -> Option<(u64, RootId, BundleCallback)> {
        let mut bundles = self.bundles.lock().unwrap();
        if bundles.is_empty() { None } else { Some(bundles.remove(0)) }
    }

    pub fn pending_bundles(&self) -> usize {
        self.bundles.lock().unwrap().len()
    }
}

struct FakeBridge {
    attempt: u64,
    rec: Arc<Recorder>,
}

impl BridgeGateway for FakeBridge {
    fn initialize(&mut self, on_complete: InitCallback) {
        self.rec.push(Call::Initialize { attempt: self.attempt });
        if self.rec.auto_init.load(Ordering::SeqCst) {
            on_complete(Ok(()));
        } else {
            self.rec.inits.lock().unwrap().push((self.attempt, on_complete));
        }
    }

    fn destroy(&mut self, is_reload: bool, on_complete: DestroyCallback) {
        self.rec.push(Call::Destroy {
            attempt: self.attempt,
            is_reload,
        });
        if self.rec.auto_destroy.load(Ordering::SeqCst) {
            on_complete();
        } else {
            self.rec
                .destroys
                .lock()
                .unwrap()
                .push((self.attempt, is_reload, on_complete));
        }
    }

    fn run_bundle(&mut self, root: RootId, source: &BundleSource, on_complete: Option<BundleCallback>) {
        self.rec.push(Call::RunBundle {
            attempt: self.attempt,
            root,
            path: source.path().into_owned(),
        });
        if let Some(cb) = on_complete {
            self.rec.bundles.lock().unwrap().push((self.attempt, root, cb));
        }
    }

    fn load_instance(&mut self, component: &str, root: RootId, _params: &InstanceParams) {
        self.rec.push(Call::LoadInstance {
            attempt: self.attempt,
            component: component.to_string(),
            root,
        });
    }

    fn notify_js_exception(&mut self, err: &ScriptError) {
        self.rec.push(Call::NotifyException {
            message: err.message.to_string(),
        });
    }

    fn destroy_instance(&mut self, root: RootId) {
        self.rec.push(Call::DestroyInstance {
            attempt: self.attempt,
            root,
        });
    }

    fn pause_instance(&mut self, root: RootId) {
        self.rec.push(Call::PauseInstance { root });
    }

    fn resume_instance(&mut self, root: RootId) {
        self.rec.push(Call::ResumeInstance { root });
    }

    fn send_event(&mut self, name: &str, _params: &Value) {
        self.rec.push(Call::SendEvent {
            name: name.to_string(),
        });
    }
}

struct FakeTree {
    id: u32,
    rec: Arc<Recorder>,
}

impl RenderTree for FakeTree {
    fn create_root(&mut self, surface: &RenderSurface) -> Result<(), EngineError> {
        if self.rec.fail_create_root.load(Ordering::SeqCst) {
            return Err(EngineError::construction("root view rejected"));
        }
        self.rec.push(Call::CreateRoot {
            tree: self.id,
            root: surface.root_id,
        });
        Ok(())
    }

    fn destroy_root(&mut self, root: RootId) {
        self.rec.push(Call::DestroyRoot { tree: self.id, root });
    }

    fn destroy(self: Box<Self>) {
        self.rec.push(Call::TreeDestroyed { tree: self.id });
    }
}

struct Plain;

impl ModuleRegistry for Plain {
    fn destroy(self: Box<Self>) {}
}

impl ResourceManager for Plain {
    fn destroy(self: Box<Self>) {}
}

struct FakeInspector(Arc<Recorder>);

impl Inspector for FakeInspector {
    fn destroy(self: Box<Self>, is_reload: bool) {
        self.0.push(Call::InspectorDestroyed { is_reload });
    }
}

pub struct FakeFactory {
    pub rec: Arc<Recorder>,
}

impl RuntimeFactory for FakeFactory {
    fn create_resource_manager(&self) -> Result<Box<dyn ResourceManager>, EngineError> {
        Ok(Box::new(Plain))
    }

    fn create_inspector(&self) -> Result<Option<Box<dyn Inspector>>, EngineError> {
        Ok(Some(Box::new(FakeInspector(Arc::clone(&self.rec)))))
    }

    fn create_module_registry(&self) -> Result<Box<dyn ModuleRegistry>, EngineError> {
        Ok(Box::new(Plain))
    }

    fn create_bridge(&self, params: &BridgeParams) -> Result<Box<dyn BridgeGateway>, EngineError> {
        if self.rec.fail_bridge.load(Ordering::SeqCst) {
            return Err(EngineError::construction("bridge unavailable"));
        }
        Ok(Box::new(FakeBridge {
            attempt: params.attempt,
            rec: Arc::clone(&self.rec),
        }))
    }

    fn create_render_tree(&self) -> Result<Box<dyn RenderTree>, EngineError> {
        let id = self.rec.next_tree.fetch_add(1, Ordering::SeqCst) + 1;
        self.rec.push(Call::TreeCreated { tree: id });
        Ok(Box::new(FakeTree {
            id,
            rec: Arc::clone(&self.rec),
        }))
    }
}

/// Hands out root ids 1, 2, 3, ... unless the host context is `Refuse`.
#[derive(Default)]
pub struct Surfaces {
    next: AtomicU32,
}

pub struct Refuse;

impl RenderSurfaceFactory for Surfaces {
    fn create_root_view(&self, host: &HostContext) -> Option<RenderSurface> {
        if host.downcast_ref::<Refuse>().is_some() {
            return None;
        }
        let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Some(RenderSurface {
            root_id: RootId(id as i32),
            host: host.clone(),
        })
    }
}

/// Records every init outcome it receives.
#[derive(Default)]
pub struct InitLog {
    seen: Mutex<Vec<(EngineInitStatus, Option<String>)>>,
}

impl InitLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<(EngineInitStatus, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<EngineInitStatus> {
        self.seen.lock().unwrap().iter().map(|(s, _)| *s).collect()
    }
}

impl EngineListener for InitLog {
    fn on_initialized(&self, status: EngineInitStatus, message: Option<&str>) {
        self.seen
            .lock()
            .unwrap()
            .push((status, message.map(str::to_string)));
    }
}

/// Records every module outcome it receives.
#[derive(Default)]
pub struct ModuleLog {
    seen: Mutex<Vec<ModuleLoadStatus>>,
    first_views: AtomicU32,
}

impl ModuleLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<ModuleLoadStatus> {
        self.seen.lock().unwrap().clone()
    }

    pub fn first_views(&self) -> u32 {
        self.first_views.load(Ordering::SeqCst)
    }
}

impl ModuleListener for ModuleLog {
    fn on_load_completed(&self, status: ModuleLoadStatus, _message: Option<&str>) {
        self.seen.lock().unwrap().push(status);
    }

    fn on_first_view_added(&self) {
        self.first_views.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn config(debug_mode: bool) -> EngineConfig {
    EngineConfig {
        debug_mode,
        init_timeout: Duration::ZERO,
        core_bundle: Some(BundleSource::Asset("core.bundle".into())),
        ..EngineConfig::default()
    }
}

pub fn engine(cfg: EngineConfig, rec: &Arc<Recorder>) -> Engine {
    Engine::builder(cfg)
        .with_runtime_factory(Arc::new(FakeFactory { rec: Arc::clone(rec) }))
        .with_surface_factory(Arc::new(Surfaces::default()))
        .build()
        .unwrap()
}

/// Flushes until the bridge has parked an init callback.
///
/// Completions fired synchronously by the fake land behind the flush marker,
/// so one flush is not always enough.
pub async fn next_init(engine: &Engine, rec: &Recorder) -> (u64, InitCallback) {
    for _ in 0..16 {
        engine.flush().await;
        if let Some(parked) = rec.take_init() {
            return parked;
        }
    }
    panic!("bridge was never asked to initialize");
}

/// Flushes until the bridge has parked a bundle callback.
pub async fn next_bundle(engine: &Engine, rec: &Recorder) -> (u64, RootId, BundleCallback) {
    for _ in 0..16 {
        engine.flush().await;
        if let Some(parked) = rec.take_bundle() {
            return parked;
        }
    }
    panic!("bridge was never asked to run a bundle");
}

/// Flushes a few times so chained completions settle.
pub async fn settle(engine: &Engine) {
    for _ in 0..4 {
        engine.flush().await;
    }
}

/// Starts `engine` and completes the first init with `Ok`.
pub async fn ready(engine: &Engine, rec: &Recorder) {
    engine.start(None).unwrap();
    let (_, cb) = next_init(engine, rec).await;
    cb(Ok(()));
    engine.wait_for(|s| s == EngineState::Ready).await.unwrap();
    settle(engine).await;
}
