use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Identifier of one mounted root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub i32);

impl RootId {
    /// Root used for preloaded bundles that are not attached to a surface.
    pub const PRELOAD: RootId = RootId(-1);
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the host surface owner (window, activity, view controller).
#[derive(Clone)]
pub struct HostContext(Arc<dyn Any + Send + Sync>);

impl HostContext {
    /// Wraps a host value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns the host value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostContext(..)")
    }
}

/// A render surface created for one module load.
#[derive(Clone, Debug)]
pub struct RenderSurface {
    /// Root id assigned by the surface factory.
    pub root_id: RootId,
    /// Host that owns the surface.
    pub host: HostContext,
}

/// Creates root surfaces.
pub trait RenderSurfaceFactory: Send + Sync + 'static {
    /// Creates a root surface for `host`, or `None` if the host cannot provide one.
    fn create_root_view(&self, host: &HostContext) -> Option<RenderSurface>;
}
