//! # Initialization watchdog.
//!
//! Arms one timer per attempt. When it fires it enqueues
//! `Command::InitTimeout { attempt }`; the controller decides whether the
//! attempt is still current. Disarming cancels the timer task.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::command::{Command, Intake};

#[derive(Default)]
pub(crate) struct Watchdog {
    armed: Option<(u64, CancellationToken)>,
}

impl Watchdog {
    /// Arms the watchdog for `attempt`, replacing any previous timer.
    pub(crate) fn arm(&mut self, attempt: u64, timeout: Duration, intake: &Intake) {
        self.disarm();
        let Some(tx) = intake.sender() else {
            return;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    let _ = tx.send(Command::InitTimeout { attempt, timeout });
                }
            }
        });
        self.armed = Some((attempt, token));
    }

    /// Cancels the pending timer, if any.
    pub(crate) fn disarm(&mut self) {
        if let Some((attempt, token)) = self.armed.take() {
            tracing::trace!(attempt, "watchdog disarmed");
            token.cancel();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_with_attempt() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let intake = Intake::new(&tx);
        let mut dog = Watchdog::default();

        dog.arm(4, Duration::from_millis(50), &intake);
        assert!(dog.is_armed());

        match rx.recv().await {
            Some(Command::InitTimeout { attempt, timeout }) => {
                assert_eq!(attempt, 4);
                assert_eq!(timeout, Duration::from_millis(50));
            }
            _ => panic!("expected timeout"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let intake = Intake::new(&tx);
        let mut dog = Watchdog::default();

        dog.arm(1, Duration::from_millis(50), &intake);
        dog.disarm();
        assert!(!dog.is_armed());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }
}
