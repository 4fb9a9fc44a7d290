//! # Engine registry.
//!
//! Owned map of engines by [`EngineId`]. Hosts that run several engines side
//! by side keep one registry instead of a process-wide table.
//!
//! ## Rules
//! - Ids are allocated by the registry, start at 1 and are never reused.
//! - Removing an engine does not destroy it; `destroy_all` does both.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::RwLock;

use crate::core::Engine;

/// Identifier of an engine within one [`EngineRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(pub u32);

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Registry of live engines.
pub struct EngineRegistry {
    engines: RwLock<HashMap<EngineId, Engine>>,
    next_id: AtomicU32,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Registers `engine` under a freshly allocated id.
    pub async fn register(&self, engine: Engine) -> EngineId {
        let id = EngineId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.engines.write().await.insert(id, engine);
        tracing::debug!(%id, "engine registered");
        id
    }

    /// Returns a handle to the engine registered under `id`.
    pub async fn get(&self, id: EngineId) -> Option<Engine> {
        self.engines.read().await.get(&id).cloned()
    }

    /// Forgets `id` and returns its handle. The engine keeps running.
    pub async fn remove(&self, id: EngineId) -> Option<Engine> {
        self.engines.write().await.remove(&id)
    }

    /// Registered ids, ascending.
    pub async fn ids(&self) -> Vec<EngineId> {
        let mut ids: Vec<EngineId> = self.engines.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }

    /// Requests destruction of every registered engine and empties the registry.
    ///
    /// Returns the ids whose destroy request was accepted. Engines whose
    /// controller is already gone are skipped.
    pub async fn destroy_all(&self) -> Vec<EngineId> {
        let drained: Vec<(EngineId, Engine)> = self.engines.write().await.drain().collect();
        let mut destroyed = Vec::with_capacity(drained.len());
        for (id, engine) in drained {
            match engine.destroy() {
                Ok(()) => destroyed.push(id),
                Err(err) => tracing::debug!(%id, error = %err, "engine already closed"),
            }
        }
        destroyed.sort_unstable();
        destroyed
    }
}
