// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::observability::messages::scope::ShutdownHookRunning;
use crate::observability::messages::StructuredLog;

type Hook = Box<dyn FnOnce() + Send>;

struct GuardState {
    hooks: Vec<(String, Hook)>,
    shut_down: bool,
}

/// Owns cleanup callbacks for resources created during a run.
///
/// Hooks run once, newest first, when [`shutdown`](Self::shutdown) is called
/// or when the guard is dropped. A hook registered after shutdown runs
/// immediately.
pub struct ShutdownGuard {
    state: Mutex<GuardState>,
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GuardState {
                hooks: Vec::new(),
                shut_down: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, GuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register<F>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let name = name.into();
        let mut state = self.state();
        if state.shut_down {
            drop(state);
            ShutdownHookRunning {
                name: &name,
                remaining: 0,
            }
            .log();
            hook();
            return;
        }
        state.hooks.push((name, Box::new(hook)));
    }

    pub fn pending(&self) -> usize {
        self.state().hooks.len()
    }

    /// Run every registered hook in reverse registration order. Later calls
    /// do nothing.
    pub fn shutdown(&self) {
        let hooks = {
            let mut state = self.state();
            state.shut_down = true;
            std::mem::take(&mut state.hooks)
        };

        let mut remaining = hooks.len();
        for (name, hook) in hooks.into_iter().rev() {
            remaining -= 1;
            ShutdownHookRunning {
                name: &name,
                remaining,
            }
            .log();
            hook();
        }
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |name: &'static str| {
                let log = log.clone();
                Box::new(move || log.lock().unwrap().push(name)) as Box<dyn FnOnce() + Send>
            }
        };
        (log, make)
    }

    #[test]
    fn test_hooks_run_in_reverse_order() {
        let (log, hook) = recorder();
        let guard = ShutdownGuard::new();
        guard.register("database", hook("database"));
        guard.register("cache", hook("cache"));
        guard.register("client", hook("client"));

        guard.shutdown();

        assert_eq!(*log.lock().unwrap(), vec!["client", "cache", "database"]);
    }

    #[test]
    fn test_hooks_run_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let guard = ShutdownGuard::new();
        {
            let runs = runs.clone();
            guard.register("count", move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        guard.shutdown();
        guard.shutdown();
        drop(guard);

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_pending_hooks() {
        let (log, hook) = recorder();
        {
            let guard = ShutdownGuard::new();
            guard.register("history", hook("history"));
            assert_eq!(guard.pending(), 1);
        }

        assert_eq!(*log.lock().unwrap(), vec!["history"]);
    }

    #[test]
    fn test_register_after_shutdown_runs_immediately() {
        let (log, hook) = recorder();
        let guard = ShutdownGuard::new();
        guard.shutdown();

        guard.register("late", hook("late"));

        assert_eq!(*log.lock().unwrap(), vec!["late"]);
        assert_eq!(guard.pending(), 0);
    }
}
