use crate::error::ScriptError;

/// Receives exceptions raised by the running application.
///
/// Called on the affinity context. This channel is separate from lifecycle
/// notifications: a script exception never changes the engine state.
pub trait ExceptionHandler: Send + Sync + 'static {
    /// Handles one application exception.
    fn handle_script_exception(&self, err: &ScriptError);
}
