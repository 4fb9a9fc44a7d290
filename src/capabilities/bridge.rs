//! # Script bridge gateway.
//!
//! [`BridgeGateway`] is the boundary to the script engine. Every asynchronous
//! operation takes a one-shot completion callback. Callbacks may be invoked from
//! any thread, at most once each; invoking them synchronously from inside the
//! call is allowed.
//!
//! ## Contract
//! ```text
//! initialize(cb)            → cb(Ok(())) | cb(Err(EngineError::Bridge{..}))
//! destroy(is_reload, cb)    → cb()  (after the script side is torn down)
//! run_bundle(root, src, cb) → cb(Ok(())) | cb(Err(..))
//! load_instance(name, root, params)   fire-and-forget
//! notify_js_exception(err)            fire-and-forget
//! ```

use serde_json::Value;

use crate::capabilities::{BundleSource, RootId};
use crate::error::{EngineError, ScriptError};
use crate::module::InstanceParams;

/// Completion of [`BridgeGateway::initialize`].
pub type InitCallback = Box<dyn FnOnce(Result<(), EngineError>) + Send + 'static>;

/// Completion of [`BridgeGateway::destroy`].
pub type DestroyCallback = Box<dyn FnOnce() + Send + 'static>;

/// Completion of [`BridgeGateway::run_bundle`].
pub type BundleCallback = Box<dyn FnOnce(Result<(), EngineError>) + Send + 'static>;

/// Script bridge owned by one runtime context.
///
/// The controller calls these methods only from its own loop, so
/// implementations need `Send` but not `Sync`.
pub trait BridgeGateway: Send + 'static {
    /// Starts the script engine. Completion is reported through `on_complete`.
    fn initialize(&mut self, on_complete: InitCallback);

    /// Tears down the script engine.
    ///
    /// `is_reload = true` means a restart will follow on a fresh bridge.
    fn destroy(&mut self, is_reload: bool, on_complete: DestroyCallback);

    /// Executes a bundle against `root`.
    fn run_bundle(&mut self, root: RootId, source: &BundleSource, on_complete: Option<BundleCallback>);

    /// Instantiates the named application component on `root`.
    fn load_instance(&mut self, component: &str, root: RootId, params: &InstanceParams);

    /// Forwards an application exception to the script side.
    fn notify_js_exception(&mut self, err: &ScriptError);

    /// Asks the script side to destroy the instance mounted on `root`.
    ///
    /// Confirmation arrives later through `Engine::on_instance_destroy`.
    fn destroy_instance(&mut self, _root: RootId) {}

    /// Pauses the instance mounted on `root`.
    fn pause_instance(&mut self, _root: RootId) {}

    /// Resumes the instance mounted on `root`.
    fn resume_instance(&mut self, _root: RootId) {}

    /// Dispatches a host event into the script runtime.
    fn send_event(&mut self, _name: &str, _params: &Value) {}
}
