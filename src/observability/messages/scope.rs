// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for closeable scopes and shutdown guards.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A closeable scope was closed and its tasks were cancelled.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
///
/// # Example
/// ```
/// use the_railyard::observability::messages::scope::ScopeClosed;
///
/// let msg = ScopeClosed { tracked_tasks: 3 };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ScopeClosed {
    pub tracked_tasks: usize,
}

impl Display for ScopeClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scope closed, cancelling {} tracked tasks", self.tracked_tasks)
    }
}

impl StructuredLog for ScopeClosed {
    fn log(&self) {
        tracing::debug!(tracked_tasks = self.tracked_tasks, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "scope_closed",
            span_name = name,
            tracked_tasks = self.tracked_tasks,
        )
    }
}

/// A task was submitted to a scope that had already been closed.
///
/// # Log Level
/// `warn!` - Caller is racing shutdown
pub struct SpawnRejected;

impl Display for SpawnRejected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected task spawn: scope is already closed")
    }
}

impl StructuredLog for SpawnRejected {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("spawn_rejected", span_name = name)
    }
}

/// A shutdown hook is about to run.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
///
/// # Example
/// ```
/// use the_railyard::observability::messages::scope::ShutdownHookRunning;
///
/// let msg = ShutdownHookRunning {
///     name: "flush-history",
///     remaining: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ShutdownHookRunning<'a> {
    pub name: &'a str,
    pub remaining: usize,
}

impl Display for ShutdownHookRunning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running shutdown hook '{}' ({} remaining)",
            self.name, self.remaining
        )
    }
}

impl StructuredLog for ShutdownHookRunning<'_> {
    fn log(&self) {
        tracing::debug!(name = self.name, remaining = self.remaining, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "shutdown_hook",
            span_name = name,
            hook = self.name,
            remaining = self.remaining,
        )
    }
}
