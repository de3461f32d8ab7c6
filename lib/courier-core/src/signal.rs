//! Cooperative cancellation.
//!
//! An [`AbortController`] hands out [`AbortSignal`]s; calling
//! [`AbortController::abort`] wakes every signal. A signal attached to a
//! request makes the in-flight call fail with [`Error::Aborted`].
//!
//! # Example
//!
//! ```ignore
//! let controller = AbortController::new();
//! let pending = client.get("/slow").signal(controller.signal()).send();
//! controller.abort();
//! assert!(pending.await.unwrap_err().is_aborted());
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::{Error, Result};

/// Owner side of a cancellation token.
#[derive(Debug, Clone)]
pub struct AbortController {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Create a controller that has not been aborted.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A signal observing this controller.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Abort every request holding one of this controller's signals.
    pub fn abort(&self) {
        self.sender.send_replace(true);
    }

    /// Whether [`abort`](Self::abort) was called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.sender.borrow()
    }
}

/// Observer side of a cancellation token.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    receiver: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Whether the controller has aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the controller aborts.
    ///
    /// Never resolves if the controller is dropped without aborting.
    pub async fn aborted(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `future` unless the signal fires first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Aborted`] if the signal was already aborted or fires
    /// before `future` completes, otherwise the future's own result.
    pub async fn guard<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_aborted() {
            return Err(Error::Aborted);
        }
        tokio::select! {
            biased;
            () = self.aborted() => Err(Error::Aborted),
            result = future => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn controller_starts_clear() {
        let controller = AbortController::new();
        assert!(!controller.is_aborted());
        assert!(!controller.signal().is_aborted());
    }

    #[test]
    fn abort_reaches_existing_and_new_signals() {
        let controller = AbortController::new();
        let before = controller.signal();
        controller.abort();

        assert!(controller.is_aborted());
        assert!(before.is_aborted());
        assert!(controller.signal().is_aborted());
    }

    #[tokio::test]
    async fn guard_passes_through_result() {
        let controller = AbortController::new();
        let result = controller.signal().guard(async { Ok(7) }).await;
        assert_eq!(result.expect("not aborted"), 7);
    }

    #[tokio::test]
    async fn guard_fails_fast_when_already_aborted() {
        let controller = AbortController::new();
        controller.abort();

        let result = controller
            .signal()
            .guard(async { Ok::<_, Error>("never polled") })
            .await;

        assert!(result.expect_err("aborted").is_aborted());
    }

    #[tokio::test]
    async fn guard_interrupts_pending_future() {
        let controller = AbortController::new();
        let signal = controller.signal();

        let aborter = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            aborter.abort();
        });

        let result = signal
            .guard(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;

        assert!(result.expect_err("aborted").is_aborted());
    }

    #[tokio::test]
    async fn dropped_controller_never_aborts() {
        let signal = AbortController::new().signal();
        let result = signal.guard(async { Ok("done") }).await;
        assert_eq!(result.expect("not aborted"), "done");
    }
}
