//! # Runtime subsystems and the factory that builds them.
//!
//! A runtime context owns one instance of each subsystem. The factory is asked
//! for a fresh set on every initialization attempt; the render tree is the only
//! subsystem that may be carried from one context into the next.

use crate::capabilities::{BridgeGateway, BundleSource, RenderSurface, RootId};
use crate::error::EngineError;

/// Parameters handed to [`RuntimeFactory::create_bridge`].
#[derive(Clone, Debug)]
pub struct BridgeParams {
    /// Core bundle the bridge executes during initialization.
    pub core_bundle: Option<BundleSource>,
    /// Development mode.
    pub debug_mode: bool,
    /// Shared script group (`None` = dedicated context).
    pub group_id: Option<i32>,
    /// Initialization attempt this bridge belongs to (1-based).
    pub attempt: u64,
}

/// DOM-like render tree.
pub trait RenderTree: Send + 'static {
    /// Creates and attaches the root backing `surface`.
    fn create_root(&mut self, surface: &RenderSurface) -> Result<(), EngineError>;

    /// Destroys the root `root`.
    fn destroy_root(&mut self, root: RootId);

    /// Host went to background.
    fn on_pause(&mut self) {}

    /// Host came back to foreground.
    fn on_resume(&mut self) {}

    /// Releases the tree.
    fn destroy(self: Box<Self>);
}

/// Registry of native modules exposed to script.
pub trait ModuleRegistry: Send + 'static {
    /// Releases all modules.
    fn destroy(self: Box<Self>);
}

/// Resource-fetch manager (asset/file/network processors).
pub trait ResourceManager: Send + 'static {
    /// Releases the manager.
    fn destroy(self: Box<Self>);
}

/// Developer inspector. Only built in debug mode.
pub trait Inspector: Send + 'static {
    /// A root was bound.
    fn attach_root(&mut self, _root: RootId) {}

    /// Releases the inspector. `is_reload = true` keeps the debugging session open.
    fn destroy(self: Box<Self>, is_reload: bool);
}

/// Builds the subsystems of one runtime context.
///
/// Any method may fail; a failure aborts the current attempt with
/// `INIT_EXCEPTION` and everything built so far is released.
pub trait RuntimeFactory: Send + Sync + 'static {
    /// Builds the resource-fetch manager.
    fn create_resource_manager(&self) -> Result<Box<dyn ResourceManager>, EngineError>;

    /// Builds the inspector. Called in debug mode only.
    fn create_inspector(&self) -> Result<Option<Box<dyn Inspector>>, EngineError> {
        Ok(None)
    }

    /// Builds the native module registry.
    fn create_module_registry(&self) -> Result<Box<dyn ModuleRegistry>, EngineError>;

    /// Builds the script bridge.
    fn create_bridge(&self, params: &BridgeParams) -> Result<Box<dyn BridgeGateway>, EngineError>;

    /// Builds a fresh render tree.
    ///
    /// Not called when a restart carries the previous tree forward.
    fn create_render_tree(&self) -> Result<Box<dyn RenderTree>, EngineError>;
}
