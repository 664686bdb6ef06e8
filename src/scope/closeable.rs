// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::errors::FlowError;
use crate::observability::messages::scope::{ScopeClosed, SpawnRejected};
use crate::observability::messages::StructuredLog;

/// A task scope that can be closed once.
///
/// Tasks spawned through the scope race against its cancellation token and
/// resolve to `None` when the scope is closed before they finish. Closing is
/// idempotent: only the first call cancels and reports `true`.
///
/// # Example
/// ```rust
/// use the_railyard::scope::CloseableScope;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), the_railyard::errors::FlowError> {
/// let scope = CloseableScope::new();
/// let task = scope.spawn(async { 40 + 2 })?;
///
/// assert_eq!(task.await?, Some(42));
/// assert!(scope.close());
/// assert!(!scope.close());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CloseableScope {
    token: CancellationToken,
    tracker: TaskTracker,
    closed: AtomicBool,
    handle: Option<Handle>,
}

impl Default for CloseableScope {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseableScope {
    /// A scope spawning on the runtime that calls [`spawn`](Self::spawn).
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            closed: AtomicBool::new(false),
            handle: None,
        }
    }

    /// A scope spawning every task on `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            closed: AtomicBool::new(false),
            handle: Some(handle),
        }
    }

    /// A child token, cancelled when this scope closes.
    pub fn token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn spawn<F>(&self, future: F) -> Result<JoinHandle<Option<F::Output>>, FlowError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self.is_closed() {
            SpawnRejected.log();
            return Err(FlowError::Closed);
        }

        let token = self.token.clone();
        let task = async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        };

        Ok(match &self.handle {
            Some(handle) => self.tracker.spawn_on(task, handle),
            None => self.tracker.spawn(task),
        })
    }

    /// Cancel every task in the scope. Returns `true` only for the call that
    /// actually closed it.
    pub fn close(&self) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        ScopeClosed {
            tracked_tasks: self.tracker.len(),
        }
        .log();
        self.tracker.close();
        self.token.cancel();
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the scope and wait until every spawned task has returned.
    pub async fn close_and_join(&self) {
        self.close();
        self.tracker.wait().await;
    }
}

impl Drop for CloseableScope {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawned_task_completes_normally() {
        let scope = CloseableScope::new();
        let task = scope.spawn(async { "done" }).unwrap();

        assert_eq!(task.await.unwrap(), Some("done"));
        assert!(!scope.is_closed());
    }

    #[tokio::test]
    async fn test_close_is_one_shot() {
        let scope = CloseableScope::new();

        assert!(scope.close());
        assert!(!scope.close());
        assert!(scope.is_closed());
    }

    #[tokio::test]
    async fn test_concurrent_close_succeeds_exactly_once() {
        let scope = Arc::new(CloseableScope::new());

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let scope = scope.clone();
                tokio::spawn(async move { scope.close() })
            })
            .collect();

        let mut winners = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_close_cancels_running_tasks() {
        let scope = CloseableScope::new();
        let task = scope
            .spawn(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                1
            })
            .unwrap();

        scope.close_and_join().await;

        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_spawn_after_close_is_rejected() {
        let scope = CloseableScope::new();
        scope.close();

        assert!(matches!(scope.spawn(async {}), Err(FlowError::Closed)));
    }

    #[tokio::test]
    async fn test_drop_closes_scope() {
        let scope = CloseableScope::new();
        let token = scope.token();

        drop(scope);

        assert!(token.is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_with_handle_spawns_on_given_runtime() {
        let scope = CloseableScope::with_handle(Handle::current());
        let task = scope.spawn(async { 7 }).unwrap();

        assert_eq!(task.await.unwrap(), Some(7));
    }
}
