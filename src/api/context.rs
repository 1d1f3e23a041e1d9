//! Per-call deadline and cancellation signal.

use std::future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use super::error::ApiError;

/// Carries the deadline and an optional cancellation signal for one
/// service call. Cloning shares the same signal.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Fires the cancellation signal of the contexts it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl RequestContext {
    /// A context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// The same context with its deadline set `timeout` from now. The
    /// cancellation signal is kept.
    pub fn deadline_in(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Attach a manual cancellation signal.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves once the deadline passes or cancellation fires, yielding the
    /// error to surface. Pending forever for a background context.
    pub async fn done(&self) -> ApiError {
        let expired = async {
            match self.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped handle can never cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        future::pending::<()>().await;
                    }
                }
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = expired => ApiError::cancelled("request deadline exceeded"),
            _ = cancelled => ApiError::cancelled("request cancelled"),
        }
    }
}
