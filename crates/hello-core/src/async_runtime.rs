//! Async runtime integration for Hello Lattice.
//!
//! [`AsyncRuntime`] owns the Tokio runtime that drives the lookup service
//! and the bounded property-name retrieval. The composition root builds it
//! and hands it to whoever needs it; there is no global instance.
//!
//! ```
//! use hello_core::async_runtime::{
//!     AsyncRuntime, AsyncRuntimeConfig, CancellationToken, spawn_cancellable_on,
//! };
//!
//! let runtime = AsyncRuntime::new(AsyncRuntimeConfig::default()).unwrap();
//! let token = CancellationToken::new();
//! let task = spawn_cancellable_on(runtime.handle(), &token, |_| async { 21 * 2 });
//! assert_eq!(runtime.block_on(task).unwrap(), 42);
//! ```
//!
//! # Runtime Types
//!
//! - **Multi-threaded** (default): Tokio's work-stealing scheduler. Spawned
//!   tasks make progress on their own.
//! - **Single-threaded**: a current-thread runtime. Spawned tasks only run
//!   while the owner is inside [`AsyncRuntime::block_on`], in spawn order.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};

use crate::logging::targets;

/// The type of async runtime to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeType {
    /// Tokio's multi-threaded scheduler.
    #[default]
    MultiThreaded,

    /// A current-thread scheduler driven by the caller.
    SingleThreaded,
}

/// Configuration for the async runtime.
#[derive(Debug, Clone)]
pub struct AsyncRuntimeConfig {
    /// The type of runtime to create.
    pub runtime_type: RuntimeType,
    /// Worker count for the multi-threaded runtime. `None` uses one per core.
    pub worker_threads: Option<usize>,
    /// Name given to runtime threads.
    pub thread_name: String,
}

impl Default for AsyncRuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_type: RuntimeType::MultiThreaded,
            worker_threads: None,
            thread_name: "hello-async".to_string(),
        }
    }
}

impl AsyncRuntimeConfig {
    /// A multi-threaded configuration.
    pub fn multi_threaded() -> Self {
        Self::default()
    }

    /// A single-threaded configuration.
    pub fn single_threaded() -> Self {
        Self {
            runtime_type: RuntimeType::SingleThreaded,
            ..Self::default()
        }
    }

    /// Set the thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A cooperative cancellation token.
///
/// Clones share state: cancelling any clone cancels them all. Cancellation
/// is sticky and cannot be undone.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: targets::RUNTIME, "cancellation requested");
            self.inner.notify.notify_waiters();
        }
    }

    /// Resolve once cancellation is requested. Resolves immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// A task spawned with [`spawn_cancellable_on`].
///
/// Awaiting the handle yields the task's output, or the [`JoinError`] of a
/// task that panicked or was aborted. Dropping the handle detaches the task.
#[derive(Debug)]
pub struct AsyncTaskHandle<T> {
    task: JoinHandle<T>,
}

impl<T> AsyncTaskHandle<T> {
    /// Stop the task at its next suspension point.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl<T> Future for AsyncTaskHandle<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx)
    }
}

/// Spawn the future built by `f` on `handle`.
///
/// `f` receives a clone of `token`. The task should await
/// `token.cancelled()` or poll `token.is_cancelled()` and stop on its own;
/// [`AsyncTaskHandle::abort`] is the forced stop.
pub fn spawn_cancellable_on<F, Fut, T>(
    handle: &Handle,
    token: &CancellationToken,
    f: F,
) -> AsyncTaskHandle<T>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tracing::trace!(target: targets::RUNTIME, "spawning cancellable task");
    AsyncTaskHandle {
        task: handle.spawn(f(token.clone())),
    }
}

enum Flavor {
    Multi(Runtime),
    Single(Runtime),
}

/// The async runtime.
pub struct AsyncRuntime {
    flavor: Flavor,
}

impl AsyncRuntime {
    /// Build a runtime per `config`. The time driver is always enabled.
    pub fn new(config: AsyncRuntimeConfig) -> std::result::Result<Self, AsyncRuntimeError> {
        tracing::debug!(
            target: targets::RUNTIME,
            runtime_type = ?config.runtime_type,
            thread_name = %config.thread_name,
            "creating async runtime"
        );

        let flavor = match config.runtime_type {
            RuntimeType::MultiThreaded => {
                let mut builder = Builder::new_multi_thread();
                if let Some(workers) = config.worker_threads {
                    builder.worker_threads(workers);
                }
                Flavor::Multi(build(&mut builder, &config)?)
            }
            RuntimeType::SingleThreaded => {
                Flavor::Single(build(&mut Builder::new_current_thread(), &config)?)
            }
        };
        Ok(Self { flavor })
    }

    fn runtime(&self) -> &Runtime {
        match &self.flavor {
            Flavor::Multi(runtime) | Flavor::Single(runtime) => runtime,
        }
    }

    /// The runtime type.
    pub fn runtime_type(&self) -> RuntimeType {
        match self.flavor {
            Flavor::Multi(_) => RuntimeType::MultiThreaded,
            Flavor::Single(_) => RuntimeType::SingleThreaded,
        }
    }

    /// The handle tasks are spawned through.
    pub fn handle(&self) -> &Handle {
        self.runtime().handle()
    }

    /// Run `future` to completion on the current thread.
    ///
    /// Must not be called from within an async context.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime().block_on(future)
    }

    /// Shut the runtime down without waiting for outstanding tasks.
    pub fn shutdown(self) {
        tracing::debug!(
            target: targets::RUNTIME,
            runtime_type = ?self.runtime_type(),
            "shutting down async runtime"
        );
        match self.flavor {
            Flavor::Multi(runtime) | Flavor::Single(runtime) => runtime.shutdown_background(),
        }
    }
}

fn build(
    builder: &mut Builder,
    config: &AsyncRuntimeConfig,
) -> std::result::Result<Runtime, AsyncRuntimeError> {
    builder
        .thread_name(&config.thread_name)
        .enable_time()
        .build()
        .map_err(AsyncRuntimeError::CreationFailed)
}

impl fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("runtime_type", &self.runtime_type())
            .finish_non_exhaustive()
    }
}

/// Errors that can occur with the async runtime.
#[derive(Debug, thiserror::Error)]
pub enum AsyncRuntimeError {
    /// Tokio could not build the runtime.
    #[error("Failed to create async runtime: {0}")]
    CreationFailed(#[source] std::io::Error),
}
