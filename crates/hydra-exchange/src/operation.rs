//! Operation graphs on the shared worker pool
//!
//! Every multi-step computation (quote chains, parameter building, fee
//! estimation, submit-and-monitor) is a [`CompoundOperation`]: a DAG of units
//! where each unit is spawned on the [`OperationQueue`] only after the units
//! it depends on have produced their typed output. A failed dependency
//! short-circuits its dependents, and the whole graph resolves to that error.
//!
//! Cancellation is cooperative. In-flight units keep running, but any result
//! observed after [`CompoundOperation::cancel`] is discarded and the graph
//! resolves to [`HydraExchangeError::Cancelled`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::runtime::Handle;

use crate::errors::{HydraExchangeError, Result};

// ─── Queue ───────────────────────────────────────────────────────────────────

/// Shared worker pool the units of every operation graph are spawned on
#[derive(Clone, Debug)]
pub struct OperationQueue {
    handle: Handle,
}

impl OperationQueue {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Queue backed by the runtime the caller is running on
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| HydraExchangeError::OperationFailed {
                message: format!("no worker runtime available: {}", e),
            })
    }

    /// Run one unit on the pool
    pub fn spawn<T, F>(&self, work: F) -> BoxFuture<'static, Result<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let task = self.handle.spawn(work);
        async move {
            task.await.map_err(|e| HydraExchangeError::OperationFailed {
                message: format!("worker task failed: {}", e),
            })?
        }
        .boxed()
    }
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// Cancellation marker shared by the units of one graph
///
/// Joining two graphs merges their markers, so cancelling the joined graph
/// reaches both branches.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag {
    flags: Vec<Arc<AtomicBool>>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self {
            flags: vec![Arc::new(AtomicBool::new(false))],
        }
    }

    pub fn cancel(&self) {
        for flag in &self.flags {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.iter().any(|f| f.load(Ordering::SeqCst))
    }

    /// `Err(Cancelled)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(HydraExchangeError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn merged(&self, other: &CancellationFlag) -> Self {
        let mut flags = self.flags.clone();
        for flag in &other.flags {
            if !flags.iter().any(|f| Arc::ptr_eq(f, flag)) {
                flags.push(flag.clone());
            }
        }
        Self { flags }
    }
}

// ─── CompoundOperation ───────────────────────────────────────────────────────

/// Deferred DAG resolving to `T`
///
/// Nothing runs until the operation is awaited through [`run`](Self::run)
/// or consumed as the dependency of another operation.
pub struct CompoundOperation<T> {
    queue: OperationQueue,
    cancel: CancellationFlag,
    future: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> CompoundOperation<T> {
    /// Leaf unit with no dependencies
    pub fn new<F>(queue: &OperationQueue, work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let cancel = CancellationFlag::new();
        let unit_queue = queue.clone();
        let unit_cancel = cancel.clone();
        let future = async move {
            unit_cancel.check()?;
            let value = unit_queue.spawn(work).await?;
            unit_cancel.check()?;
            Ok(value)
        }
        .boxed();

        Self {
            queue: queue.clone(),
            cancel,
            future,
        }
    }

    /// Operation already resolved to `value`
    pub fn with_result(queue: &OperationQueue, value: T) -> Self {
        Self {
            queue: queue.clone(),
            cancel: CancellationFlag::new(),
            future: futures::future::ready(Ok(value)).boxed(),
        }
    }

    /// Operation already failed with `error`
    pub fn with_error(queue: &OperationQueue, error: HydraExchangeError) -> Self {
        Self {
            queue: queue.clone(),
            cancel: CancellationFlag::new(),
            future: futures::future::ready(Err(error)).boxed(),
        }
    }

    pub fn queue(&self) -> &OperationQueue {
        &self.queue
    }

    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Dependent unit fed with this operation's output
    ///
    /// `work` is spawned on the queue only after this operation succeeded
    /// and was not cancelled.
    pub fn then<U, F, Fut>(self, work: F) -> CompoundOperation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U>> + Send + 'static,
    {
        let queue = self.queue.clone();
        let cancel = self.cancel.clone();
        let dependency = self.future;

        let future = async move {
            let value = dependency.await?;
            cancel.check()?;
            let next = queue.spawn(work(value)).await?;
            cancel.check()?;
            Ok(next)
        }
        .boxed();

        CompoundOperation {
            queue: self.queue,
            cancel: self.cancel,
            future,
        }
    }

    /// Synchronous transformation of the output, run inline
    pub fn map<U, F>(self, transform: F) -> CompoundOperation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let dependency = self.future;

        let future = async move {
            let value = dependency.await?;
            cancel.check()?;
            transform(value)
        }
        .boxed();

        CompoundOperation {
            queue: self.queue,
            cancel: self.cancel,
            future,
        }
    }

    /// Run two independent graphs in parallel; first failure wins
    pub fn join<U: Send + 'static>(self, other: CompoundOperation<U>) -> CompoundOperation<(T, U)> {
        let cancel = self.cancel.merged(&other.cancel);
        let check = cancel.clone();
        let queue = self.queue.clone();
        let left = self.future;
        let right = other.future;

        let future = async move {
            let values = futures::future::try_join(queue.spawn(left), queue.spawn(right)).await?;
            check.check()?;
            Ok(values)
        }
        .boxed();

        CompoundOperation {
            queue: self.queue,
            cancel,
            future,
        }
    }

    /// Submit the graph to the queue and wait for its result
    pub async fn run(self) -> Result<T> {
        let result = self.queue.spawn(self.future).await;
        self.cancel.check()?;
        result
    }
}
