//! Simulated script bridge that answers from its own thread.
//!
//! Starts an engine in debug mode, mounts a module, performs a developer
//! reload (the render tree survives it) and tears everything down.
//!
//! ```text
//! cargo run --example reload --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use enginevisor::{
    BridgeGateway, BridgeParams, BundleCallback, BundleSource, DestroyCallback, Engine,
    EngineConfig, EngineError, EngineListenerFn, EngineState, HostContext, InitCallback,
    InstanceParams, LogWriter, ModuleListenerFn, ModuleLoadRequest, ModuleRegistry, RenderSurface,
    RenderSurfaceFactory, RenderTree, ResourceManager, RootId, RuntimeFactory, ScriptError,
    Subscribe,
};
use tracing_subscriber::EnvFilter;

/// Bridge whose completions arrive on a worker thread after a short delay.
struct ThreadedBridge {
    attempt: u64,
}

impl BridgeGateway for ThreadedBridge {
    fn initialize(&mut self, done: InitCallback) {
        let attempt = self.attempt;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            println!("bridge: attempt {attempt} initialized");
            done(Ok(()));
        });
    }

    fn destroy(&mut self, is_reload: bool, done: DestroyCallback) {
        let attempt = self.attempt;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            println!("bridge: attempt {attempt} destroyed (reload={is_reload})");
            done();
        });
    }

    fn run_bundle(&mut self, root: RootId, source: &BundleSource, done: Option<BundleCallback>) {
        println!("bridge: run {} on root {root}", source.path());
        if let Some(done) = done {
            done(Ok(()));
        }
    }

    fn load_instance(&mut self, component: &str, root: RootId, _params: &InstanceParams) {
        println!("bridge: load {component} on root {root} (attempt {})", self.attempt);
    }

    fn notify_js_exception(&mut self, err: &ScriptError) {
        println!("bridge: exception {err}");
    }
}

struct Tree;

impl RenderTree for Tree {
    fn create_root(&mut self, surface: &RenderSurface) -> Result<(), EngineError> {
        println!("render: root {} created", surface.root_id);
        Ok(())
    }

    fn destroy_root(&mut self, root: RootId) {
        println!("render: root {root} destroyed");
    }

    fn destroy(self: Box<Self>) {
        println!("render: tree destroyed");
    }
}

struct Plain;

impl ModuleRegistry for Plain {
    fn destroy(self: Box<Self>) {}
}

impl ResourceManager for Plain {
    fn destroy(self: Box<Self>) {}
}

struct Factory;

impl RuntimeFactory for Factory {
    fn create_resource_manager(&self) -> Result<Box<dyn ResourceManager>, EngineError> {
        Ok(Box::new(Plain))
    }

    fn create_module_registry(&self) -> Result<Box<dyn ModuleRegistry>, EngineError> {
        Ok(Box::new(Plain))
    }

    fn create_bridge(&self, params: &BridgeParams) -> Result<Box<dyn BridgeGateway>, EngineError> {
        Ok(Box::new(ThreadedBridge {
            attempt: params.attempt,
        }))
    }

    fn create_render_tree(&self) -> Result<Box<dyn RenderTree>, EngineError> {
        println!("render: new tree");
        Ok(Box::new(Tree))
    }
}

#[derive(Default)]
struct Surfaces {
    next: AtomicU32,
}

impl RenderSurfaceFactory for Surfaces {
    fn create_root_view(&self, host: &HostContext) -> Option<RenderSurface> {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Some(RenderSurface {
            root_id: RootId(id as i32),
            host: host.clone(),
        })
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = EngineConfig {
        debug_mode: true,
        init_timeout: Duration::from_secs(2),
        ..EngineConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let engine = Engine::builder(cfg)
        .with_runtime_factory(Arc::new(Factory))
        .with_surface_factory(Arc::new(Surfaces::default()))
        .with_subscribers(subs)
        .build()?;

    engine.start(Some(EngineListenerFn::arc(|status, msg| {
        println!("listener: initialized {status} {msg:?}");
    })))?;
    engine.wait_for(|s| s.is_settled()).await?;

    let request = ModuleLoadRequest::new("Home").with_host(HostContext::new("main-window"));
    engine.load_module(
        request,
        Some(ModuleListenerFn::arc(|status, _| {
            println!("listener: module {status}");
        })),
    )?;
    engine.flush().await;

    engine.reload()?;
    engine.wait_for(|s| s == EngineState::Restarting).await?;
    engine.wait_for(|s| s == EngineState::Ready).await?;
    engine.flush().await;
    println!("roots after reload: {:?}", engine.roots());

    engine.destroy()?;
    engine.wait_for(|s| s.is_terminal()).await?;
    engine.flush().await;
    Ok(())
}
