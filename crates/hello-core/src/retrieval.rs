//! Bounded, cancellable background retrieval.
//!
//! [`PropertyNameRetrieval`] starts a cancellable unit of work, waits for it
//! up to a deadline, and maps the outcome:
//!
//! - completion → the resolved name
//! - deadline → [`Error::Timeout`]
//! - cancellation → [`Error::Startup`] with
//!   [`ErrorCode::PropertyNameRetrievalCancelled`]
//!
//! There are no retries. On timeout or cancellation the background task is
//! aborted.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::async_runtime::{AsyncRuntime, CancellationToken, spawn_cancellable_on};
use crate::error::{Error, ErrorCode, Result, StartupError};
use crate::logging::targets;

/// How long the retrieval waits before giving up.
pub const PROPERTY_NAME_TIMEOUT: Duration = Duration::from_secs(10);

/// The resolver reported that it observed cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("the operation was cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// A bounded wait for a property name resolved in the background.
#[derive(Debug, Clone)]
pub struct PropertyNameRetrieval {
    subject: &'static str,
    expected: &'static str,
    timeout: Duration,
}

impl PropertyNameRetrieval {
    /// A retrieval of `subject`, whose value should be `expected`.
    ///
    /// Both names appear in the cancellation message.
    pub fn new(subject: &'static str, expected: &'static str) -> Self {
        Self {
            subject,
            expected,
            timeout: PROPERTY_NAME_TIMEOUT,
        }
    }

    /// Override the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the name on a task spawned through `handle` and wait for it.
    ///
    /// `resolve` receives a clone of `token` and should report
    /// [`Cancelled`] once it observes cancellation. Cancelling `token` from
    /// outside also ends the wait. Must be awaited within a Tokio runtime
    /// with the time driver enabled.
    pub async fn run<F, Fut>(
        &self,
        handle: &Handle,
        token: &CancellationToken,
        resolve: F,
    ) -> Result<String>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<String, Cancelled>> + Send + 'static,
    {
        if token.is_cancelled() {
            return Err(self.cancelled(Cancelled));
        }

        let mut task = spawn_cancellable_on(handle, token, resolve);

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            joined = tokio::time::timeout(self.timeout, &mut task) => Some(joined),
        };

        match outcome {
            None => {
                task.abort();
                Err(self.cancelled(Cancelled))
            }
            Some(Err(_elapsed)) => {
                task.abort();
                tracing::warn!(
                    target: targets::RUNTIME,
                    subject = self.subject,
                    timeout = ?self.timeout,
                    "property name retrieval timed out"
                );
                Err(Error::Timeout {
                    subject: self.subject.to_string(),
                    timeout: self.timeout,
                })
            }
            Some(Ok(Ok(Ok(name)))) => {
                tracing::debug!(
                    target: targets::RUNTIME,
                    subject = self.subject,
                    %name,
                    "property name resolved"
                );
                Ok(name)
            }
            Some(Ok(Ok(Err(cancelled)))) => Err(self.cancelled(cancelled)),
            Some(Ok(Err(join_error))) if join_error.is_cancelled() => {
                Err(self.cancelled(Cancelled))
            }
            Some(Ok(Err(join_error))) => Err(Error::TaskFailed(join_error.to_string())),
        }
    }

    /// Blocking form of [`run`](Self::run) for synchronous callers.
    pub fn run_blocking<F, Fut>(
        &self,
        runtime: &AsyncRuntime,
        token: &CancellationToken,
        resolve: F,
    ) -> Result<String>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<String, Cancelled>> + Send + 'static,
    {
        runtime.block_on(self.run(runtime.handle(), token, resolve))
    }

    fn cancelled(&self, cause: Cancelled) -> Error {
        tracing::warn!(
            target: targets::RUNTIME,
            subject = self.subject,
            "property name retrieval cancelled"
        );
        StartupError::new(
            Some(Box::new(cause)),
            ErrorCode::PropertyNameRetrievalCancelled,
            &[&self.subject, &self.expected],
        )
        .into()
    }
}
