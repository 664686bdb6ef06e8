// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Chooses the runtime each rail's consumer task is spawned on.
#[derive(Clone, Default)]
pub enum RailScheduler {
    /// Spawn on the runtime that runs the terminal operation.
    #[default]
    Current,
    /// Spawn every rail on one runtime.
    Shared(Handle),
    /// Pick a runtime per rail index.
    PerRail(Arc<dyn Fn(usize) -> Handle + Send + Sync>),
}

impl RailScheduler {
    pub(crate) fn spawn<F>(&self, rail: usize, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        match self {
            RailScheduler::Current => tokio::spawn(future),
            RailScheduler::Shared(handle) => handle.spawn(future),
            RailScheduler::PerRail(select) => select(rail).spawn(future),
        }
    }
}

impl fmt::Debug for RailScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RailScheduler::Current => write!(f, "RailScheduler::Current"),
            RailScheduler::Shared(_) => write!(f, "RailScheduler::Shared"),
            RailScheduler::PerRail(_) => write!(f, "RailScheduler::PerRail"),
        }
    }
}
