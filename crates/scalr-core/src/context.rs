//! Execution context passed to every remote call
//!
//! A [`Context`] carries an optional deadline and a cancellation token.
//! Both apply to the whole HTTP exchange, request and response body.

use crate::error::{Result, ScalrError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellable, deadline-bearing handle for API calls
///
/// ```rust
/// use scalr_core::Context;
/// use std::time::Duration;
///
/// let ctx = Context::background().with_timeout(Duration::from_secs(30));
/// assert!(ctx.deadline().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    budget: Option<Duration>,
    token: CancellationToken,
}

impl Context {
    /// A context with no deadline that is never cancelled unless asked to
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context whose deadline is at most `timeout` from now
    ///
    /// An earlier deadline inherited from `self` is kept. A timeout too large
    /// to represent as an instant adds no deadline. Cancelling the parent
    /// cancels the derived context too.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let token = self.token.child_token();
        let Some(candidate) = Instant::now().checked_add(timeout) else {
            return Self {
                deadline: self.deadline,
                budget: self.budget,
                token,
            };
        };
        let (deadline, budget) = match self.deadline {
            Some(existing) if existing <= candidate => (existing, self.budget.unwrap_or(timeout)),
            _ => (candidate, timeout),
        };
        Self {
            deadline: Some(deadline),
            budget: Some(budget),
            token,
        }
    }

    /// Cancel this context and every context derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Drive `fut` to completion unless the deadline passes or the context is cancelled first
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.token.is_cancelled() {
            return Err(ScalrError::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .unwrap_or_else(|_| {
                        Err(ScalrError::DeadlineExceeded(
                            self.budget.unwrap_or_default(),
                        ))
                    }),
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ScalrError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok::<_, ScalrError>(42) }).await.unwrap();
        assert_eq!(value, 42);
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ScalrError>(())
            })
            .await;
        assert!(matches!(result, Err(ScalrError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let ctx = Context::background();
        ctx.cancel();
        let result = ctx.run(async { Ok::<_, ScalrError>(()) }).await;
        assert!(matches!(result, Err(ScalrError::Cancelled)));
    }

    #[tokio::test]
    async fn test_parent_cancellation_reaches_child() {
        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_keeps_earlier_deadline() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(3600));
        assert_eq!(child.deadline(), parent.deadline());
        assert!(child.remaining().unwrap() <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_adds_no_deadline() {
        let ctx = Context::background().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        let value = ctx.run(async { Ok::<_, ScalrError>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let bounded = Context::background().with_timeout(Duration::from_secs(5));
        let child = bounded.with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(child.deadline(), bounded.deadline());
    }
}
