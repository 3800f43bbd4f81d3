//! Per-call deadline and cancellation

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::ShipmanError;

/// Carries the caller's deadline and cancellation signal into a repository call.
///
/// A call that is still waiting on the store when the deadline passes fails
/// with [`ShipmanError::DeadlineExceeded`]; one whose token fires fails with
/// [`ShipmanError::Cancelled`]. Each call is a single statement, so an
/// abandoned call leaves nothing half-written.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token, e.g. a child of the server's shutdown token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `operation` to completion unless the deadline or cancellation fires first
    pub async fn run<T, F>(&self, operation: F) -> Result<T, ShipmanError>
    where
        F: Future<Output = Result<T, ShipmanError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, operation)
                    .await
                    .unwrap_or_else(|_| Err(ShipmanError::DeadlineExceeded)),
                None => operation.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ShipmanError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_has_no_deadline() {
        assert!(CallContext::background().deadline().is_none());

        let before = Instant::now();
        let ctx = CallContext::with_timeout(Duration::from_secs(30));
        let deadline = ctx.deadline().unwrap();
        assert!(deadline >= before + Duration::from_secs(30));
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn completes_within_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok::<_, ShipmanError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn deadline_exceeded() {
        let ctx = CallContext::with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ShipmanError>(())
            })
            .await;
        assert!(matches!(result, Err(ShipmanError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn cancelled_before_completion() {
        let token = CancellationToken::new();
        let ctx = CallContext::background().with_cancellation(token.clone());
        token.cancel();

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ShipmanError>(())
            })
            .await;
        assert!(matches!(result, Err(ShipmanError::Cancelled)));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn errors_pass_through_unchanged() {
        let ctx = CallContext::background();
        let result: Result<(), _> = ctx
            .run(async { Err(ShipmanError::ConstraintViolation("imo".to_string())) })
            .await;
        assert!(matches!(result, Err(ShipmanError::ConstraintViolation(_))));
    }
}
