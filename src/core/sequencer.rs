//! # Module load sequencing.
//!
//! ```text
//! validate ──✗──► INVALID_ARGUMENT
//!    │
//! engine Ready? ──✗──► ENGINE_UNINITIALIZED   (no bridge call)
//!    │
//! create_root_view ──None──► VARIABLE_NULL
//!    │
//! render_tree.create_root ──✗──► FAILED
//!    │
//! bind root ─► release: run_bundle(root) + load_instance → outcome on bundle completion
//!           └► debug:   load_instance → OK
//! ```
//!
//! The sequencer is stateless apart from the mode; the controller owns the
//! context and the bindings and passes them in.

use std::sync::Arc;

use crate::capabilities::{BundleCallback, BundleSource, RenderSurfaceFactory, RootId};
use crate::core::context::RuntimeContext;
use crate::core::roots::{ReloadEntry, RootBinding, RootBindings};
use crate::listeners::ModuleListener;
use crate::module::{InstanceParams, ModuleLoadRequest};
use crate::status::ModuleLoadStatus;

/// Result of one sequencing pass.
#[derive(Debug, PartialEq)]
pub(crate) enum LoadOutcome {
    /// Finished without waiting on the bridge.
    Completed {
        root: Option<RootId>,
        status: ModuleLoadStatus,
        message: Option<String>,
    },
    /// Waiting for the bundle completion of `root`.
    Pending { root: RootId },
}

impl LoadOutcome {
    fn completed(root: Option<RootId>, status: ModuleLoadStatus, message: Option<String>) -> Self {
        LoadOutcome::Completed {
            root,
            status,
            message,
        }
    }
}

pub(crate) struct ModuleLoadSequencer {
    debug_mode: bool,
}

impl ModuleLoadSequencer {
    pub(crate) fn new(debug_mode: bool) -> Self {
        Self { debug_mode }
    }

    /// Runs one module load against the current context.
    ///
    /// `ctx` is `None` (or `ready` false) when the engine cannot take loads.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn load(
        &self,
        ready: bool,
        ctx: Option<&mut RuntimeContext>,
        surfaces: &dyn RenderSurfaceFactory,
        roots: &RootBindings,
        request: ModuleLoadRequest,
        listener: Option<Arc<dyn ModuleListener>>,
        on_bundle: &dyn Fn(RootId) -> Option<BundleCallback>,
    ) -> LoadOutcome {
        if let Err(err) = request.validate(self.debug_mode) {
            return LoadOutcome::completed(None, ModuleLoadStatus::InvalidArgument, Some(err.as_message()));
        }
        let ctx = match ctx {
            Some(ctx) if ready => ctx,
            _ => {
                return LoadOutcome::completed(
                    None,
                    ModuleLoadStatus::EngineUninitialized,
                    Some("engine is not ready".to_string()),
                );
            }
        };

        let (host, component, source, params) = request.into_parts();
        let surface = match host.as_ref().and_then(|h| surfaces.create_root_view(h)) {
            Some(surface) => surface,
            None => {
                return LoadOutcome::completed(
                    None,
                    ModuleLoadStatus::VariableNull,
                    Some("render surface unavailable".to_string()),
                );
            }
        };

        let root = surface.root_id;
        if let Err(err) = ctx.render_tree().create_root(&surface) {
            return LoadOutcome::completed(Some(root), ModuleLoadStatus::Failed, Some(err.as_message()));
        }
        if let Some(inspector) = ctx.inspector() {
            inspector.attach_root(root);
        }

        let replaced = roots.bind(RootBinding {
            surface,
            component: component.clone(),
            source: source.clone(),
            params: params.clone(),
            listener,
            on_destroyed: None,
        });
        if replaced.is_some() {
            tracing::warn!(%root, "root rebound, previous binding replaced");
        }

        self.dispatch(ctx, root, &component, source.as_ref(), &params, on_bundle)
    }

    /// Loads every bound module again on a freshly initialized context.
    ///
    /// `recreate_roots` is set when the render tree was rebuilt, so the roots
    /// must be created again before the instances are loaded.
    pub(crate) fn reload_bound(
        &self,
        ctx: &mut RuntimeContext,
        entries: Vec<ReloadEntry>,
        recreate_roots: bool,
        on_bundle: &dyn Fn(RootId) -> Option<BundleCallback>,
    ) -> Vec<(Option<Arc<dyn ModuleListener>>, LoadOutcome)> {
        let mut outcomes = Vec::with_capacity(entries.len());
        for e in entries {
            if recreate_roots {
                if let Err(err) = ctx.render_tree().create_root(&e.surface) {
                    let outcome = LoadOutcome::completed(
                        Some(e.root),
                        ModuleLoadStatus::Failed,
                        Some(err.as_message()),
                    );
                    outcomes.push((e.listener, outcome));
                    continue;
                }
            }
            let outcome = self.dispatch(ctx, e.root, &e.component, e.source.as_ref(), &e.params, on_bundle);
            outcomes.push((e.listener, outcome));
        }
        outcomes
    }

    /// Runs the preload bundle on [`RootId::PRELOAD`].
    pub(crate) fn preload(&self, ctx: &mut RuntimeContext, source: &BundleSource) {
        ctx.bridge().run_bundle(RootId::PRELOAD, source, None);
    }

    fn dispatch(
        &self,
        ctx: &mut RuntimeContext,
        root: RootId,
        component: &str,
        source: Option<&BundleSource>,
        params: &InstanceParams,
        on_bundle: &dyn Fn(RootId) -> Option<BundleCallback>,
    ) -> LoadOutcome {
        match source {
            Some(source) if !self.debug_mode => {
                ctx.bridge().run_bundle(root, source, on_bundle(root));
                ctx.bridge().load_instance(component, root, params);
                LoadOutcome::Pending { root }
            }
            _ => {
                ctx.bridge().load_instance(component, root, params);
                LoadOutcome::completed(Some(root), ModuleLoadStatus::Ok, None)
            }
        }
    }
}
