//! Error types used by the engine controller and its collaborators.
//!
//! This module defines:
//!
//! - [`EngineError`]: lifecycle failures. They never cross the async boundary as
//!   return values; the controller converts them into a status delivered through
//!   the listener channel.
//! - [`ControlError`]: synchronous failures of the engine handle itself.
//! - [`ScriptError`]: payload of an exception raised by the running application.
//!
//! [`EngineError`] provides helper methods (`as_label`, `as_message`) for
//! logging and [`EngineError::is_retryable`] for recovery decisions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::core::EngineState;
use crate::status::EngineInitStatus;

/// # Lifecycle failures.
///
/// Construction, bridge and timeout failures end the current attempt only;
/// a fresh `start`/`restart` retries the full sequence.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// The runtime context could not be built.
    #[error("runtime context construction failed: {reason}")]
    Construction {
        /// The underlying error message.
        reason: String,
    },

    /// The bridge reported a failure.
    #[error("bridge failure: {reason}")]
    Bridge {
        /// The underlying error message.
        reason: String,
    },

    /// A transition was attempted from a state that cannot honor it.
    #[error("wrong state: {operation} not allowed in {state:?}")]
    WrongState {
        /// The operation that was rejected.
        operation: &'static str,
        /// The state observed when it was rejected.
        state: EngineState,
    },

    /// The init watchdog fired before the bridge answered.
    #[error("initialization timed out after {timeout:?}")]
    Timeout {
        /// The configured watchdog duration.
        timeout: Duration,
    },

    /// A module load request was malformed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the request.
        reason: String,
    },

    /// The running application raised an exception.
    #[error("script exception: {0}")]
    ScriptException(ScriptError),

    /// The development server could not be reached.
    #[error("dev server error: {reason}")]
    DevServer {
        /// The underlying error message.
        reason: String,
    },
}

impl EngineError {
    /// Shorthand for [`EngineError::Construction`].
    pub fn construction(reason: impl Into<String>) -> Self {
        EngineError::Construction {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EngineError::Bridge`].
    pub fn bridge(reason: impl Into<String>) -> Self {
        EngineError::Bridge {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`EngineError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use enginevisor::EngineError;
    ///
    /// let err = EngineError::bridge("isolate crashed");
    /// assert_eq!(err.as_label(), "engine_bridge_failure");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Construction { .. } => "engine_construction_failure",
            EngineError::Bridge { .. } => "engine_bridge_failure",
            EngineError::WrongState { .. } => "engine_wrong_state",
            EngineError::Timeout { .. } => "engine_timeout",
            EngineError::InvalidArgument { .. } => "engine_invalid_argument",
            EngineError::ScriptException(_) => "engine_script_exception",
            EngineError::DevServer { .. } => "engine_dev_server",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::Construction { reason } => format!("construction: {reason}"),
            EngineError::Bridge { reason } => format!("bridge: {reason}"),
            EngineError::WrongState { operation, state } => {
                format!("wrong state: {operation}, state={state:?}")
            }
            EngineError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            EngineError::InvalidArgument { reason } => format!("invalid argument: {reason}"),
            EngineError::ScriptException(err) => format!("script: {err}"),
            EngineError::DevServer { reason } => format!("dev server: {reason}"),
        }
    }

    /// Indicates whether a fresh attempt may succeed.
    ///
    /// # Example
    /// ```
    /// use enginevisor::EngineError;
    ///
    /// assert!(EngineError::construction("no renderer").is_retryable());
    /// assert!(!EngineError::invalid_argument("empty path").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Construction { .. }
                | EngineError::Bridge { .. }
                | EngineError::Timeout { .. }
                | EngineError::DevServer { .. }
        )
    }

    /// Maps the error onto the status reported through `on_initialized`.
    pub fn status(&self) -> EngineInitStatus {
        match self {
            EngineError::Construction { .. } => EngineInitStatus::InitException,
            EngineError::Bridge { .. } => EngineInitStatus::ErrBridge,
            EngineError::Timeout { .. } => EngineInitStatus::Timeout,
            EngineError::DevServer { .. } => EngineInitStatus::ErrDevServer,
            EngineError::WrongState { .. }
            | EngineError::InvalidArgument { .. }
            | EngineError::ScriptException(_) => EngineInitStatus::WrongState,
        }
    }
}

/// Error returned synchronously by [`Engine`](crate::Engine) methods.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// The controller loop has exited; no more requests are accepted.
    #[error("engine controller closed")]
    Closed,
}

/// Error returned by [`EngineBuilder::build`](crate::EngineBuilder::build).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// `with_runtime_factory` was not called.
    #[error("runtime factory not configured")]
    MissingRuntimeFactory,

    /// `with_surface_factory` was not called.
    #[error("render surface factory not configured")]
    MissingSurfaceFactory,

    /// The default affinity thread could not be spawned.
    #[error("failed to spawn affinity thread: {0}")]
    AffinitySpawn(#[from] std::io::Error),
}

/// Exception raised by the running application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// Exception message.
    pub message: Arc<str>,
    /// Script stack, if the bridge captured one.
    pub stack: Option<Arc<str>>,
}

impl ScriptError {
    /// Creates an exception without a stack.
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    /// Attaches a script stack.
    pub fn with_stack(mut self, stack: impl Into<Arc<str>>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stack {
            Some(stack) => write!(f, "{}\n{}", self.message, stack),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ScriptError {}
