//! Cancellation and deadline propagation for client calls.
//!
//! # Responsibilities
//! - Carry an optional deadline and an optional cancellation token
//! - Race an in-flight call against both
//!
//! # Design Decisions
//! - Derived cancellable contexts use child tokens: cancelling a parent reaches
//!   every child, cancelling a child leaves the parent alone
//! - A derived deadline never extends the parent's deadline
//! - Racing happens in the caller's task; nothing is spawned
//! - Dropping the future returned by a call also aborts it

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

/// Execution context passed to every call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

/// Handle used to cancel every call running under a [`Context`].
#[derive(Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Cancel the associated context. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Context {
    /// A context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline` (or earlier, if the parent does).
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Derive a cancellable context.
    ///
    /// The derived context is cancelled by the returned handle or by any
    /// cancellation inherited from `self`.
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let token = match &self.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        self.cancel = Some(token.clone());
        (self, CancelHandle { token })
    }

    /// The effective deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Run `fut` to completion unless the context is cancelled or expires first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(ClientError::Cancelled),
            () = deadline => Err(ClientError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}
