//! Context implementation for request-scoped data and cancellation
//!
//! This module provides the Context type which carries request-scoped values
//! like cancellation signals, deadlines and the tracing span of the operation.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries request-scoped values like cancellation signals and timeouts
/// CRITICAL: Pass this as first parameter to ALL async trait methods
/// This enables proper cancellation and timeout handling
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    span: tracing::Span,
    done: watch::Receiver<bool>,
    done_tx: Arc<watch::Sender<bool>>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                span: tracing::Span::none(),
                done: done_rx,
                done_tx: Arc::new(done_tx),
            }),
        }
    }

    /// Sets the deadline after which the context counts as cancelled.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(Instant::now() + timeout),
                span: self.inner.span.clone(),
                done: self.inner.done.clone(),
                done_tx: self.inner.done_tx.clone(),
            }),
        }
    }

    /// Attaches the span every log line of this operation is recorded under.
    pub fn with_operation(self, operation: &str, type_name: &str) -> Self {
        let span = tracing::info_span!("tfplug", operation, type_name);

        Self {
            inner: Arc::new(ContextInner {
                deadline: self.inner.deadline,
                span,
                done: self.inner.done.clone(),
                done_tx: self.inner.done_tx.clone(),
            }),
        }
    }

    pub fn span(&self) -> &tracing::Span {
        &self.inner.span
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow() || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver for explicit cancellation. A passed deadline is not sent on
    /// it; use `cancelled` or `is_cancelled` to observe both.
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                _ = self.signalled() => {}
                _ = time::sleep_until(deadline.into()) => {}
            },
            None => self.signalled().await,
        }
    }

    async fn signalled(&self) {
        let mut done = self.done();
        loop {
            if *done.borrow_and_update() {
                return;
            }
            if done.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
