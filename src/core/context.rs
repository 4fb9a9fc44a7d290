//! # Runtime context: the subsystems of one initialization attempt.
//!
//! A [`RuntimeContext`] exclusively owns the bridge, module registry, resource
//! manager, optional inspector and the render tree. It is built once per
//! attempt and disposed exactly once.
//!
//! ## Build order
//! ```text
//! resources → inspector (debug only) → modules → bridge → render tree (fresh or carried)
//! ```
//! If any step fails, everything built so far is released (a carried render
//! tree included) and the error is returned.
//!
//! ## Dispose order
//! ```text
//! inspector.destroy(is_reload) → render tree (destroyed or handed back) → modules → resources → bridge dropped
//! ```

use crate::capabilities::{
    BridgeGateway, BridgeParams, Inspector, ModuleRegistry, RenderTree, ResourceManager,
    RuntimeFactory,
};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Subsystems of one initialization attempt.
pub(crate) struct RuntimeContext {
    attempt: u64,
    resources: Box<dyn ResourceManager>,
    inspector: Option<Box<dyn Inspector>>,
    modules: Box<dyn ModuleRegistry>,
    bridge: Box<dyn BridgeGateway>,
    render_tree: Box<dyn RenderTree>,
}

impl RuntimeContext {
    /// Builds every subsystem for `attempt`.
    ///
    /// `carried` is a render tree handed over by the previous context; when
    /// present the factory is not asked for a new one.
    pub(crate) fn build(
        factory: &dyn RuntimeFactory,
        cfg: &EngineConfig,
        attempt: u64,
        carried: Option<Box<dyn RenderTree>>,
    ) -> Result<Self, EngineError> {
        let mut partial = Partial {
            carried,
            ..Partial::default()
        };

        match partial.fill(factory, cfg, attempt) {
            Ok(ctx) => Ok(ctx),
            Err(err) => {
                partial.release();
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn attempt(&self) -> u64 {
        self.attempt
    }

    #[inline]
    pub(crate) fn bridge(&mut self) -> &mut dyn BridgeGateway {
        self.bridge.as_mut()
    }

    #[inline]
    pub(crate) fn render_tree(&mut self) -> &mut dyn RenderTree {
        self.render_tree.as_mut()
    }

    #[inline]
    pub(crate) fn inspector(&mut self) -> Option<&mut (dyn Inspector + 'static)> {
        self.inspector.as_deref_mut()
    }

    /// Releases every subsystem.
    ///
    /// With `keep_render_tree`, the tree is returned instead of destroyed and the
    /// inspector keeps its session for the next context.
    pub(crate) fn dispose(self, keep_render_tree: bool) -> Option<Box<dyn RenderTree>> {
        let RuntimeContext {
            attempt,
            resources,
            inspector,
            modules,
            bridge,
            render_tree,
        } = self;

        if let Some(inspector) = inspector {
            inspector.destroy(keep_render_tree);
        }
        let kept = if keep_render_tree {
            Some(render_tree)
        } else {
            render_tree.destroy();
            None
        };
        modules.destroy();
        resources.destroy();
        drop(bridge);

        tracing::debug!(attempt, keep_render_tree, "runtime context disposed");
        kept
    }
}

/// Subsystems built so far during [`RuntimeContext::build`].
#[derive(Default)]
struct Partial {
    carried: Option<Box<dyn RenderTree>>,
    resources: Option<Box<dyn ResourceManager>>,
    inspector: Option<Box<dyn Inspector>>,
    modules: Option<Box<dyn ModuleRegistry>>,
    bridge: Option<Box<dyn BridgeGateway>>,
}

impl Partial {
    fn fill(
        &mut self,
        factory: &dyn RuntimeFactory,
        cfg: &EngineConfig,
        attempt: u64,
    ) -> Result<RuntimeContext, EngineError> {
        self.resources = Some(factory.create_resource_manager()?);
        if cfg.debug_mode {
            self.inspector = factory.create_inspector()?;
        }
        self.modules = Some(factory.create_module_registry()?);

        let params = BridgeParams {
            core_bundle: cfg.effective_core_bundle(),
            debug_mode: cfg.debug_mode,
            group_id: cfg.group(),
            attempt,
        };
        self.bridge = Some(factory.create_bridge(&params)?);

        let render_tree = match self.carried.take() {
            Some(tree) => tree,
            None => factory.create_render_tree()?,
        };

        match (self.resources.take(), self.modules.take(), self.bridge.take()) {
            (Some(resources), Some(modules), Some(bridge)) => Ok(RuntimeContext {
                attempt,
                resources,
                inspector: self.inspector.take(),
                modules,
                bridge,
                render_tree,
            }),
            _ => {
                render_tree.destroy();
                Err(EngineError::construction("runtime context incomplete"))
            }
        }
    }

    fn release(self) {
        if let Some(inspector) = self.inspector {
            inspector.destroy(false);
        }
        if let Some(tree) = self.carried {
            tree.destroy();
        }
        if let Some(modules) = self.modules {
            modules.destroy();
        }
        if let Some(resources) = self.resources {
            resources.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::capabilities::{BundleSource, DestroyCallback, InitCallback, RenderSurface, RootId};
    use crate::error::ScriptError;
    use crate::module::InstanceParams;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Part(&'static str, Log);

    impl ResourceManager for Part {
        fn destroy(self: Box<Self>) {
            self.1.lock().unwrap().push(format!("{}.destroy", self.0));
        }
    }

    impl ModuleRegistry for Part {
        fn destroy(self: Box<Self>) {
            self.1.lock().unwrap().push(format!("{}.destroy", self.0));
        }
    }

    impl Inspector for Part {
        fn destroy(self: Box<Self>, is_reload: bool) {
            self.1.lock().unwrap().push(format!("{}.destroy({is_reload})", self.0));
        }
    }

    impl RenderTree for Part {
        fn create_root(&mut self, _surface: &RenderSurface) -> Result<(), EngineError> {
            Ok(())
        }
        fn destroy_root(&mut self, _root: RootId) {}
        fn destroy(self: Box<Self>) {
            self.1.lock().unwrap().push(format!("{}.destroy", self.0));
        }
    }

    impl BridgeGateway for Part {
        fn initialize(&mut self, _on_complete: InitCallback) {}
        fn destroy(&mut self, _is_reload: bool, _on_complete: DestroyCallback) {}
        fn run_bundle(&mut self, _root: RootId, _source: &BundleSource, _cb: Option<crate::capabilities::BundleCallback>) {}
        fn load_instance(&mut self, _component: &str, _root: RootId, _params: &InstanceParams) {}
        fn notify_js_exception(&mut self, _err: &ScriptError) {}
    }

    struct Factory {
        log: Log,
        fail_bridge: bool,
    }

    impl RuntimeFactory for Factory {
        fn create_resource_manager(&self) -> Result<Box<dyn ResourceManager>, EngineError> {
            Ok(Box::new(Part("resources", self.log.clone())))
        }
        fn create_inspector(&self) -> Result<Option<Box<dyn Inspector>>, EngineError> {
            Ok(Some(Box::new(Part("inspector", self.log.clone()))))
        }
        fn create_module_registry(&self) -> Result<Box<dyn ModuleRegistry>, EngineError> {
            Ok(Box::new(Part("modules", self.log.clone())))
        }
        fn create_bridge(&self, _params: &BridgeParams) -> Result<Box<dyn BridgeGateway>, EngineError> {
            if self.fail_bridge {
                return Err(EngineError::construction("no bridge"));
            }
            Ok(Box::new(Part("bridge", self.log.clone())))
        }
        fn create_render_tree(&self) -> Result<Box<dyn RenderTree>, EngineError> {
            self.log.lock().unwrap().push("tree.create".into());
            Ok(Box::new(Part("tree", self.log.clone())))
        }
    }

    fn debug_cfg() -> EngineConfig {
        EngineConfig {
            debug_mode: true,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_dispose_hands_back_the_render_tree() {
        let log: Log = Arc::default();
        let factory = Factory { log: log.clone(), fail_bridge: false };

        let ctx = RuntimeContext::build(&factory, &debug_cfg(), 1, None).unwrap();
        let kept = ctx.dispose(true);
        assert!(kept.is_some());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["tree.create", "inspector.destroy(true)", "modules.destroy", "resources.destroy"]
        );

        log.lock().unwrap().clear();
        let ctx = RuntimeContext::build(&factory, &debug_cfg(), 2, kept).unwrap();
        assert_eq!(ctx.attempt(), 2);
        assert!(log.lock().unwrap().is_empty(), "carried tree must not be rebuilt");
    }

    #[test]
    fn test_failed_build_releases_partial_state() {
        let log: Log = Arc::default();
        let factory = Factory { log: log.clone(), fail_bridge: true };
        let carried: Box<dyn RenderTree> = Box::new(Part("old-tree", log.clone()));

        let err = RuntimeContext::build(&factory, &debug_cfg(), 3, Some(carried))
            .err()
            .expect("bridge failure");
        assert!(matches!(err, EngineError::Construction { .. }));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["inspector.destroy(false)", "old-tree.destroy", "modules.destroy", "resources.destroy"]
        );
    }

    #[test]
    fn test_release_mode_skips_inspector() {
        let log: Log = Arc::default();
        let factory = Factory { log: log.clone(), fail_bridge: false };

        let ctx = RuntimeContext::build(&factory, &EngineConfig::default(), 1, None).unwrap();
        ctx.dispose(false);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["tree.create", "tree.destroy", "modules.destroy", "resources.destroy"]
        );
    }
}
