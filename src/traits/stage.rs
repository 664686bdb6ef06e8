// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

/// Whether a stage rewrites values or only decides which ones survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Produces a new value for every input.
    Map,
    /// Passes the input through unchanged or drops it.
    Filter,
}

/// One named step applied to every value on a rail.
///
/// `apply` returns `Ok(None)` to drop the value and `Err` to fail the
/// pipeline; a failure on any rail tears down every rail.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>>;

    fn name(&self) -> &'static str;

    fn kind(&self) -> StageKind;
}
