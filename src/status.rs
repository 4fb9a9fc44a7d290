//! # Status codes surfaced to listeners.
//!
//! - [`EngineInitStatus`] is delivered through `EngineListener::on_initialized`.
//! - [`ModuleLoadStatus`] is delivered through `ModuleListener::on_load_completed`.
//!
//! Both carry a stable snake_case label for logs and a numeric code that stays
//! stable across releases (hosts frequently forward it over FFI).

use std::fmt;

/// Outcome of an initialization (or restart) attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineInitStatus {
    /// Runtime is ready.
    Ok,
    /// The request arrived in a state that cannot honor it (e.g. after destroy).
    WrongState,
    /// The runtime context could not be constructed.
    InitException,
    /// The bridge reported a failed initialization.
    ErrBridge,
    /// Initialization succeeded but the development server could not be reached.
    ErrDevServer,
    /// The init watchdog fired before the bridge answered.
    Timeout,
}

impl EngineInitStatus {
    /// Stable numeric code.
    pub fn code(&self) -> i32 {
        match self {
            EngineInitStatus::Ok => 0,
            EngineInitStatus::WrongState => 1,
            EngineInitStatus::InitException => 2,
            EngineInitStatus::ErrBridge => 3,
            EngineInitStatus::ErrDevServer => 4,
            EngineInitStatus::Timeout => 5,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineInitStatus::Ok => "ok",
            EngineInitStatus::WrongState => "wrong_state",
            EngineInitStatus::InitException => "init_exception",
            EngineInitStatus::ErrBridge => "err_bridge",
            EngineInitStatus::ErrDevServer => "err_dev_server",
            EngineInitStatus::Timeout => "timeout",
        }
    }

    /// True for outcomes after which the runtime is usable.
    #[inline]
    pub fn is_usable(&self) -> bool {
        matches!(self, EngineInitStatus::Ok | EngineInitStatus::ErrDevServer)
    }
}

impl fmt::Display for EngineInitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Outcome of a module load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleLoadStatus {
    /// Module is running.
    Ok,
    /// Engine was not ready (or already destroyed) when the load was requested.
    EngineUninitialized,
    /// A required collaborator was missing (no render surface, no bundle loader).
    VariableNull,
    /// The request itself was malformed.
    InvalidArgument,
    /// A sequencing step failed (bundle execution, root creation).
    Failed,
}

impl ModuleLoadStatus {
    /// Stable numeric code.
    pub fn code(&self) -> i32 {
        match self {
            ModuleLoadStatus::Ok => 0,
            ModuleLoadStatus::EngineUninitialized => 1,
            ModuleLoadStatus::VariableNull => 2,
            ModuleLoadStatus::InvalidArgument => 3,
            ModuleLoadStatus::Failed => 4,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ModuleLoadStatus::Ok => "ok",
            ModuleLoadStatus::EngineUninitialized => "engine_uninitialized",
            ModuleLoadStatus::VariableNull => "variable_null",
            ModuleLoadStatus::InvalidArgument => "invalid_argument",
            ModuleLoadStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ModuleLoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
