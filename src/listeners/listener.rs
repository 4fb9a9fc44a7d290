use std::sync::Arc;

use crate::status::{EngineInitStatus, ModuleLoadStatus};

/// Receives the terminal outcome of engine initialization.
///
/// Each registered listener is called exactly once, on the affinity context.
pub trait EngineListener: Send + Sync + 'static {
    /// Initialization settled with `status`.
    fn on_initialized(&self, status: EngineInitStatus, message: Option<&str>);
}

/// Receives module load outcomes.
pub trait ModuleListener: Send + Sync + 'static {
    /// A module load finished with `status`.
    fn on_load_completed(&self, status: ModuleLoadStatus, message: Option<&str>);

    /// The first view of the loaded module was rendered.
    fn on_first_view_added(&self) {}
}

/// Receives host pause/resume notifications.
pub trait EngineLifecycleListener: Send + Sync + 'static {
    fn on_engine_pause(&self) {}
    fn on_engine_resume(&self) {}
}

/// Callback for `Engine::destroy_module`; receives `true` once the instance is gone.
pub type DestroyModuleCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Closure adapter for [`EngineListener`].
///
/// ```rust
/// use enginevisor::{EngineInitStatus, EngineListenerFn};
///
/// let listener = EngineListenerFn::arc(|status: EngineInitStatus, msg: Option<&str>| {
///     println!("engine settled: {status} {msg:?}");
/// });
/// # let _ = listener;
/// ```
pub struct EngineListenerFn<F> {
    f: F,
}

impl<F> EngineListenerFn<F>
where
    F: Fn(EngineInitStatus, Option<&str>) + Send + Sync + 'static,
{
    /// Wraps `f` into a shareable listener.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

impl<F> EngineListener for EngineListenerFn<F>
where
    F: Fn(EngineInitStatus, Option<&str>) + Send + Sync + 'static,
{
    fn on_initialized(&self, status: EngineInitStatus, message: Option<&str>) {
        (self.f)(status, message)
    }
}

/// Closure adapter for [`ModuleListener`] (load completion only).
pub struct ModuleListenerFn<F> {
    f: F,
}

impl<F> ModuleListenerFn<F>
where
    F: Fn(ModuleLoadStatus, Option<&str>) + Send + Sync + 'static,
{
    /// Wraps `f` into a shareable listener.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

impl<F> ModuleListener for ModuleListenerFn<F>
where
    F: Fn(ModuleLoadStatus, Option<&str>) + Send + Sync + 'static,
{
    fn on_load_completed(&self, status: ModuleLoadStatus, message: Option<&str>) {
        (self.f)(status, message)
    }
}
