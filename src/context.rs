//! Cancellation and deadline carrier passed to every context-aware operation.
//!
//! A [`Context`] is cheap to clone. Cancelling a parent cancels every
//! context derived from it; a derived context keeps the earlier of its own
//! and its parent's deadline.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::FalseDbError;

#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

/// Cancels the [`Context`] it was created with. Dropping it does not cancel.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Derive a context that can be cancelled through the returned handle.
    #[must_use]
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let token = self.token.child_token();
        let handle = CancelHandle {
            token: token.clone(),
        };
        (
            Context {
                token,
                deadline: self.deadline,
            },
            handle,
        )
    }

    /// Derive a context that expires at `deadline` (or earlier, if the parent does).
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Context {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why this context is done, or `None` while it is still live.
    ///
    /// Explicit cancellation wins over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<FalseDbError> {
        if self.token.is_cancelled() {
            return Some(FalseDbError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(FalseDbError::DeadlineExceeded),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the context is done, with the reason.
    ///
    /// Never resolves for a context with no deadline that is never cancelled.
    pub async fn done(&self) -> FalseDbError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => FalseDbError::Canceled,
                    () = tokio::time::sleep_until(deadline.into()) => {
                        self.err().unwrap_or(FalseDbError::DeadlineExceeded)
                    }
                }
            }
            None => {
                self.token.cancelled().await;
                FalseDbError::Canceled
            }
        }
    }

    /// Entry check for context-aware operations.
    ///
    /// # Errors
    /// Returns `FalseDbError::Canceled` or `FalseDbError::DeadlineExceeded` once the context is done.
    pub fn check(&self) -> Result<(), FalseDbError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_live() {
        let ctx = Context::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancel_propagates_to_children_only() {
        let root = Context::background();
        let (parent, cancel) = root.with_cancel();
        let child = parent.with_timeout(Duration::from_secs(60));
        cancel.cancel();
        assert_eq!(parent.err(), Some(FalseDbError::Canceled));
        assert_eq!(child.err(), Some(FalseDbError::Canceled));
        assert!(root.check().is_ok());
    }

    #[test]
    fn expired_deadline_reports_deadline_exceeded() {
        let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.check(), Err(FalseDbError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn done_resolves_on_deadline_or_cancel() {
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        assert_eq!(ctx.done().await, FalseDbError::DeadlineExceeded);

        let (ctx, cancel) = Context::background()
            .with_timeout(Duration::from_secs(60))
            .with_cancel();
        let waiter = tokio::spawn(async move { ctx.done().await });
        cancel.cancel();
        assert_eq!(waiter.await.unwrap(), FalseDbError::Canceled);
    }

    #[tokio::test]
    async fn done_stays_pending_for_live_background() {
        let pending = tokio::time::timeout(Duration::from_millis(20), Context::background().done()).await;
        assert!(pending.is_err());
    }

    #[test]
    fn child_keeps_earlier_parent_deadline() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(3600));
        assert_eq!(child.deadline(), parent.deadline());
    }
}
