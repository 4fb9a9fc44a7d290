//! # Restart coordination.
//!
//! [`RestartCoordinator`] decides whether the render tree survives a restart
//! and performs the hand-off between the old and the new runtime context.
//!
//! ## Rules
//! - The render tree is carried only in debug mode.
//! - A development reload always asks to carry it; a recovery restart carries
//!   it only when the caller requested so.
//! - The old context is fully disposed before the next one is built, so at
//!   most one context owns the tree at any time.

use crate::capabilities::RenderTree;
use crate::core::context::RuntimeContext;

/// What triggered a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartTrigger {
    /// Developer reload after the bridge confirmed its teardown.
    DevReload,
    /// Explicit `Engine::restart` (e.g. after an error).
    Recovery { preserve_render_tree: bool },
}

impl RestartTrigger {
    pub(crate) fn as_label(&self) -> &'static str {
        match self {
            RestartTrigger::DevReload => "dev-reload",
            RestartTrigger::Recovery { .. } => "recovery",
        }
    }
}

/// Outcome of [`RestartCoordinator::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RestartPlan {
    pub(crate) trigger: RestartTrigger,
    pub(crate) preserve_render_tree: bool,
}

pub(crate) struct RestartCoordinator {
    debug_mode: bool,
}

impl RestartCoordinator {
    pub(crate) fn new(debug_mode: bool) -> Self {
        Self { debug_mode }
    }

    pub(crate) fn plan(&self, trigger: RestartTrigger) -> RestartPlan {
        let requested = match trigger {
            RestartTrigger::DevReload => true,
            RestartTrigger::Recovery {
                preserve_render_tree,
            } => preserve_render_tree,
        };
        RestartPlan {
            trigger,
            preserve_render_tree: self.debug_mode && requested,
        }
    }

    /// Disposes `old` according to `plan`, returning the tree to carry forward.
    pub(crate) fn hand_off(
        &self,
        old: Option<RuntimeContext>,
        plan: &RestartPlan,
    ) -> Option<Box<dyn RenderTree>> {
        old.and_then(|ctx| ctx.dispose(plan.preserve_render_tree))
    }
}
