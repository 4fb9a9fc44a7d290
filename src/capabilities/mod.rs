//! Capabilities consumed by the engine controller.
//!
//! The controller never implements scripting, rendering or resource fetching
//! itself. It composes narrow interfaces supplied by the host:
//!
//! - [`BridgeGateway`]: script bridge (init/destroy/run bundle/load instance)
//! - [`RenderSurfaceFactory`]: creates root surfaces for module loads
//! - [`RuntimeFactory`]: builds the subsystems of one runtime context
//! - [`RenderTree`], [`ModuleRegistry`], [`ResourceManager`], [`Inspector`]: subsystems
//! - [`BundleSource`], [`BundleLoader`]: where a script bundle comes from
//! - [`ExceptionHandler`]: receives exceptions raised by the running application
//!
//! ## Threading
//! Subsystem handles are exclusively owned by the controller and only touched
//! from its loop. Completion callbacks handed to the bridge may be invoked from
//! any thread; they only enqueue a message back into the controller.

mod bridge;
mod bundle;
mod exception;
mod subsystems;
mod surface;

pub use bridge::{BridgeGateway, BundleCallback, DestroyCallback, InitCallback};
pub use bundle::{BundleLoader, BundleSource};
pub use exception::ExceptionHandler;
pub use subsystems::{
    BridgeParams, Inspector, ModuleRegistry, RenderTree, ResourceManager, RuntimeFactory,
};
pub use surface::{HostContext, RenderSurface, RenderSurfaceFactory, RootId};
