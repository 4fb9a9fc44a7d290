//! # Root bindings.
//!
//! One [`RootBinding`] per mounted root: the surface, what was loaded onto it
//! (so a restart can load it again) and an optional pending `destroy_module`
//! callback. Written only by the controller loop; handles read snapshots.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::capabilities::{BundleSource, RenderSurface, RootId};
use crate::listeners::{DestroyModuleCallback, ModuleListener};
use crate::module::InstanceParams;

/// A surface bound to a root id and the module loaded onto it.
pub(crate) struct RootBinding {
    pub(crate) surface: RenderSurface,
    pub(crate) component: String,
    pub(crate) source: Option<BundleSource>,
    pub(crate) params: InstanceParams,
    pub(crate) listener: Option<Arc<dyn ModuleListener>>,
    pub(crate) on_destroyed: Option<DestroyModuleCallback>,
}

/// Module to load again after a restart.
pub(crate) struct ReloadEntry {
    pub(crate) root: RootId,
    pub(crate) surface: RenderSurface,
    pub(crate) component: String,
    pub(crate) source: Option<BundleSource>,
    pub(crate) params: InstanceParams,
    pub(crate) listener: Option<Arc<dyn ModuleListener>>,
}

/// Shared map of root bindings, ordered by root id.
#[derive(Clone, Default)]
pub(crate) struct RootBindings {
    inner: Arc<Mutex<BTreeMap<RootId, RootBinding>>>,
}

impl RootBindings {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<RootId, RootBinding>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds `binding` to its surface's root id, returning the binding it replaced.
    pub(crate) fn bind(&self, binding: RootBinding) -> Option<RootBinding> {
        let root = binding.surface.root_id;
        self.lock().insert(root, binding)
    }

    pub(crate) fn unbind(&self, root: RootId) -> Option<RootBinding> {
        self.lock().remove(&root)
    }

    /// Stores a `destroy_module` callback on `root`.
    ///
    /// Gives the callback back when `root` is not bound.
    pub(crate) fn set_on_destroyed(
        &self,
        root: RootId,
        callback: DestroyModuleCallback,
    ) -> Result<Option<DestroyModuleCallback>, DestroyModuleCallback> {
        match self.lock().get_mut(&root) {
            Some(binding) => Ok(binding.on_destroyed.replace(callback)),
            None => Err(callback),
        }
    }

    pub(crate) fn listener(&self, root: RootId) -> Option<Arc<dyn ModuleListener>> {
        self.lock().get(&root).and_then(|b| b.listener.clone())
    }

    /// Whether a `destroy_module` callback is waiting on `root`.
    pub(crate) fn destroy_requested(&self, root: RootId) -> bool {
        self.lock().get(&root).is_some_and(|b| b.on_destroyed.is_some())
    }

    /// Bound root ids in ascending order.
    pub(crate) fn ids(&self) -> Vec<RootId> {
        self.lock().keys().copied().collect()
    }

    /// What every bound root needs to be loaded again.
    pub(crate) fn reload_entries(&self) -> Vec<ReloadEntry> {
        self.lock()
            .iter()
            .map(|(root, b)| ReloadEntry {
                root: *root,
                surface: b.surface.clone(),
                component: b.component.clone(),
                source: b.source.clone(),
                params: b.params.clone(),
                listener: b.listener.clone(),
            })
            .collect()
    }

    /// Removes every binding and returns how many there were.
    pub(crate) fn clear(&self) -> usize {
        let mut map = self.lock();
        let n = map.len();
        map.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::HostContext;

    fn binding(root: i32) -> RootBinding {
        RootBinding {
            surface: RenderSurface {
                root_id: RootId(root),
                host: HostContext::new(()),
            },
            component: format!("App{root}"),
            source: None,
            params: InstanceParams::new(),
            listener: None,
            on_destroyed: None,
        }
    }

    #[test]
    fn test_ids_are_sorted() {
        let roots = RootBindings::default();
        roots.bind(binding(9));
        roots.bind(binding(2));
        roots.bind(binding(5));
        assert_eq!(roots.ids(), vec![RootId(2), RootId(5), RootId(9)]);

        let entries = roots.reload_entries();
        assert_eq!(entries[0].component, "App2");
    }

    #[test]
    fn test_destroy_callback_requires_binding() {
        let roots = RootBindings::default();
        assert!(roots.set_on_destroyed(RootId(1), Box::new(|_| {})).is_err());

        roots.bind(binding(1));
        assert!(!roots.destroy_requested(RootId(1)));
        assert!(matches!(roots.set_on_destroyed(RootId(1), Box::new(|_| {})), Ok(None)));
        assert!(roots.destroy_requested(RootId(1)));
        let b = roots.unbind(RootId(1)).unwrap();
        assert!(b.on_destroyed.is_some());
        assert!(roots.ids().is_empty());
        assert!(!roots.destroy_requested(RootId(1)));
    }
}
