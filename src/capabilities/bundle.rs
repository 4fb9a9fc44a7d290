use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Host-provided bundle loader (custom packaging, encrypted assets, ...).
pub trait BundleLoader: Send + Sync + 'static {
    /// Path or URL identifying the bundle.
    fn path(&self) -> Cow<'_, str>;
}

/// Where a script bundle comes from.
#[derive(Clone)]
pub enum BundleSource {
    /// Bundle packaged as an application asset.
    Asset(String),
    /// Bundle on the local filesystem.
    File(PathBuf),
    /// Bundle served over the network (development server).
    Remote(String),
    /// Explicit loader supplied by the host.
    Loader(Arc<dyn BundleLoader>),
}

impl BundleSource {
    /// Path or URL of the bundle.
    pub fn path(&self) -> Cow<'_, str> {
        match self {
            BundleSource::Asset(p) | BundleSource::Remote(p) => Cow::Borrowed(p.as_str()),
            BundleSource::File(p) => p.to_string_lossy(),
            BundleSource::Loader(l) => l.path(),
        }
    }

    /// True when a path-based source has an empty path.
    ///
    /// An explicit loader is never considered empty.
    pub fn is_empty(&self) -> bool {
        match self {
            BundleSource::Loader(_) => false,
            BundleSource::File(p) => p.as_os_str().is_empty(),
            BundleSource::Asset(p) | BundleSource::Remote(p) => p.trim().is_empty(),
        }
    }

    /// True for an explicit loader.
    #[inline]
    pub fn is_loader(&self) -> bool {
        matches!(self, BundleSource::Loader(_))
    }
}

impl fmt::Debug for BundleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleSource::Asset(p) => f.debug_tuple("Asset").field(p).finish(),
            BundleSource::File(p) => f.debug_tuple("File").field(p).finish(),
            BundleSource::Remote(u) => f.debug_tuple("Remote").field(u).finish(),
            BundleSource::Loader(l) => f.debug_tuple("Loader").field(&l.path()).finish(),
        }
    }
}
