//! Per-call cancellation and deadline handling.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    #[error("operation canceled by caller")]
    Canceled,
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

/// Caller-supplied signal that bounds every cache and store round-trip.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_timeout(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn check(&self) -> Result<(), Interrupted> {
        if self.token.is_cancelled() {
            return Err(Interrupted::Canceled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(Interrupted::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` unless the token fires or the deadline passes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, Interrupted>
    where
        F: Future<Output = T>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Interrupted::Canceled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            value = fut => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_interrupted() {
        let ctx = CallContext::default();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn already_canceled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new(token);
        let result: Result<(), _> = ctx.run(async { panic!("must not be polled") }).await;
        assert_eq!(result, Err(Interrupted::Canceled));
    }

    #[tokio::test]
    async fn cancel_during_wait_aborts() {
        let token = CancellationToken::new();
        let ctx = CallContext::new(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });
        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::Canceled));
        canceller.await.expect("canceller task");
    }

    #[tokio::test]
    async fn deadline_aborts_slow_future() {
        let ctx = CallContext::with_timeout(CancellationToken::new(), Duration::from_millis(10));
        let result = ctx.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::DeadlineExceeded));
    }
}
