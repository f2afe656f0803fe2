//! Task spawning abstraction for transport completions.
//!
//! Transport operations (`send_message`, `stop_application`) complete
//! asynchronously. The router hands each operation to a [`TaskSpawner`] and
//! applies the result when the future resolves, the same way the platform
//! delivers result callbacks on its callback thread.

use futures::future::BoxFuture;

/// Abstraction for running transport completions in the background.
///
/// The router never awaits a spawned future itself. Implementations decide
/// where the work runs; the router only guarantees that it does not hold its
/// state lock while calling [`spawn`](TaskSpawner::spawn), so an
/// implementation may drive the future to completion synchronously.
pub trait TaskSpawner: Send + Sync {
    /// Runs `future` to completion. No handle is returned and there is no
    /// way to cancel the work once it has been handed over.
    fn spawn(&self, future: BoxFuture<'static, ()>);
}

/// Tokio-based spawner used by the CLI and general async embedders.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Creates a new `TokioSpawner` with the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates a new `TokioSpawner` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) {
        self.handle.spawn(future);
    }
}

/// Spawner that blocks the calling thread until the future resolves.
///
/// Completions are applied before `spawn` returns, which makes router
/// behavior fully deterministic. Suitable for synchronous embedders whose
/// transport resolves immediately, and for tests. Must not be used from
/// inside an async runtime worker.
#[derive(Clone, Copy, Default)]
pub struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) {
        futures::executor::block_on(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn tokio_spawner_executes_task() {
        let spawner = TokioSpawner::current();
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        spawner.spawn(Box::pin(async move {
            executed_clone.store(true, Ordering::SeqCst);
        }));

        // Give the task time to execute
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn inline_spawner_completes_before_returning() {
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        InlineSpawner.spawn(Box::pin(async move {
            executed_clone.store(true, Ordering::SeqCst);
        }));

        assert!(executed.load(Ordering::SeqCst));
    }
}
