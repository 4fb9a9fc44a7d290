//! Host-facing listener interfaces and the registry of pending init listeners.

mod listener;
mod registry;

pub use listener::{
    DestroyModuleCallback, EngineLifecycleListener, EngineListener, EngineListenerFn,
    ModuleListener, ModuleListenerFn,
};

pub(crate) use registry::ListenerRegistry;
