//! # LogWriter: event-to-tracing bridge
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Install a `tracing-subscriber` in the host to see the output.
//!
//! ## Example output
//! ```text
//! INFO  [init-starting] attempt=1 state=Initing
//! INFO  [ready] attempt=1 status=ok
//! WARN  [stale-completion] attempt=1 state=Destroyed reason="bridge ready"
//! INFO  [module-loaded] root=3
//! WARN  [module-load-failed] root=3 status=failed reason="bundle rejected"
//! INFO  [destroyed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::InitStarting => {
                tracing::info!(attempt = ?e.attempt, state = ?e.state, "[init-starting]");
            }
            EventKind::EngineReady => {
                tracing::info!(attempt = ?e.attempt, status = ?e.status, "[ready]");
            }
            EventKind::EngineErrored => {
                tracing::error!(attempt = ?e.attempt, status = ?e.status, reason, "[errored]");
            }
            EventKind::InitTimeoutHit => {
                tracing::warn!(attempt = ?e.attempt, timeout_ms = ?e.timeout_ms, "[init-timeout]");
            }
            EventKind::StaleCompletionDropped => {
                tracing::warn!(attempt = ?e.attempt, state = ?e.state, reason, "[stale-completion]");
            }
            EventKind::ReloadRequested => tracing::info!("[reload-requested]"),
            EventKind::RestartStarting => {
                tracing::info!(attempt = ?e.attempt, reason, "[restart-starting]");
            }
            EventKind::RenderTreeCarried => tracing::debug!("[render-tree-carried]"),
            EventKind::RenderTreeDiscarded => tracing::debug!("[render-tree-discarded]"),
            EventKind::DestroyRequested => tracing::info!("[destroy-requested]"),
            EventKind::EngineDestroyed => tracing::info!("[destroyed]"),
            EventKind::ModuleLoadStarting => tracing::debug!(component = reason, "[module-load-starting]"),
            EventKind::ModuleLoaded => tracing::info!(root = ?e.root, "[module-loaded]"),
            EventKind::ModuleLoadFailed => {
                tracing::warn!(root = ?e.root, status = ?e.status, reason, "[module-load-failed]");
            }
            EventKind::RootBound => tracing::debug!(root = ?e.root, "[root-bound]"),
            EventKind::RootUnbound => tracing::debug!(root = ?e.root, "[root-unbound]"),
            EventKind::EnginePaused => tracing::debug!("[paused]"),
            EventKind::EngineResumed => tracing::debug!("[resumed]"),
            EventKind::ScriptException => tracing::warn!(reason, "[script-exception]"),
            EventKind::DevServerError => tracing::warn!(reason, "[dev-server-error]"),
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = ?e.subscriber, reason, "[subscriber-overflow]");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = e.subscriber.unwrap_or("unknown"), reason, "[subscriber-panicked]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
