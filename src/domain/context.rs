//! Per-request execution context.
//!
//! Every repository call receives a [`RequestContext`]. Backend work is
//! driven through [`RequestContext::run`], which aborts the in-flight future
//! as soon as the context is cancelled or its deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Cancellation token plus optional deadline, scoped to one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A fresh context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().with_deadline(Instant::now() + timeout)
    }

    /// Tighten the deadline. An earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Correlation id recorded on log lines emitted for this request.
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail fast with [`DomainError::Cancelled`] if the context is already done.
    pub fn check(&self) -> DomainResult<()> {
        if self.is_done() {
            return Err(DomainError::Cancelled);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context is cancelled or times out
    /// first. The future is dropped on abort, which releases any connection
    /// or transaction it held.
    pub async fn run<T, F>(&self, fut: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                () = self.token.cancelled() => Err(DomainError::Cancelled),
                result = fut => result,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or_else(|_| Err(DomainError::Cancelled)),
            None => guarded.await,
        }
    }
}
